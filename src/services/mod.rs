//! Service layer for the watcher.
//!
//! This module contains the collaborators the reconciliation loop drives:
//! - Page fetching (`PageFetcher`, `HttpFetcher`, `ChromeFetcher`)
//! - HTML extraction (`Extractor`)
//! - Notification delivery (`Notifier`, `WebhookNotifier`)

mod extractor;
mod fetcher;
mod notifier;

pub use extractor::Extractor;
#[cfg(feature = "chrome")]
pub use fetcher::ChromeFetcher;
pub use fetcher::{HttpFetcher, PageFetcher, build_fetcher};
pub use notifier::{LogNotifier, Notifier, WebhookNotifier, build_notifier};
