// src/models/mod.rs

//! Domain models for the watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod post;
mod selectors;
mod thread;

use std::collections::HashSet;

// Re-export all public types
pub use config::{
    BoardConfig, Config, ENV_WEBHOOK_URL, FetcherBackend, FetcherConfig, NotifierConfig,
    PathsConfig, PollConfig,
};
pub use post::Post;
pub use selectors::SelectorConfig;
pub use thread::{ThreadLinks, ThreadRegistry};

/// Identifiers of every post already processed.
pub type SeenSet = HashSet<String>;
