// src/error.rs

//! Unified error handling for the watcher.

use std::fmt;

use thiserror::Error;

/// Result type alias for watcher operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Page could not be rendered (navigation, network or renderer failure)
    #[error("Fetch error for {url}: {message}")]
    Fetch { url: String, message: String },

    /// Unexpected markup
    #[error("Parse error: {0}")]
    Parse(String),

    /// Persisted state could not be read or written
    #[error("Store error for {path}: {message}")]
    Store { path: String, message: String },

    /// Notification endpoint unreachable or rejected the message
    #[error("Delivery error: {0}")]
    Delivery(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    /// Create a fetch error for a URL.
    pub fn fetch(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a store error for a file path.
    pub fn store(path: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Store {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Create a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display() {
        let err = AppError::fetch("https://example.com/thread/1", "navigation timed out");
        assert_eq!(
            err.to_string(),
            "Fetch error for https://example.com/thread/1: navigation timed out"
        );
    }

    #[test]
    fn test_store_error_display() {
        let err = AppError::store("seen_posts.json", "permission denied");
        assert_eq!(err.to_string(), "Store error for seen_posts.json: permission denied");
    }
}
