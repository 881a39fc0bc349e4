//! Storage abstractions for watcher state persistence.
//!
//! Two independent flat files survive restarts:
//!
//! ```text
//! seen_posts.json          # Seen set: ["post-1", "post-2", ...]
//! monitored_threads.json   # Thread registry: {"https://.../thread/1": "Title", ...}
//! ```
//!
//! Loads fail open: a missing, unreadable or malformed file yields empty state
//! so a corrupt store never stops the watcher from starting.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{SeenSet, ThreadRegistry};

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for state storage backends.
#[async_trait]
pub trait StateStore: Send + Sync {
    /// Load the seen set, or an empty set on any failure.
    async fn load_seen(&self) -> SeenSet;

    /// Overwrite the persisted seen set.
    async fn save_seen(&self, seen: &SeenSet) -> Result<()>;

    /// Load the thread registry, or an empty registry on any failure.
    async fn load_threads(&self) -> ThreadRegistry;

    /// Overwrite the persisted thread registry.
    async fn save_threads(&self, threads: &ThreadRegistry) -> Result<()>;
}
