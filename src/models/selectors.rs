// src/models/selectors.rs

//! CSS selectors for scraping a forum board and its threads.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// CSS selectors for scraping a forum board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Selector for thread links on the board page
    #[serde(default = "defaults::thread_link")]
    pub thread_link: String,

    /// Href substrings marking links that are not threads (e.g. "create thread")
    #[serde(default = "defaults::thread_link_exclude")]
    pub thread_link_exclude: Vec<String>,

    /// Selector for each post container on a thread page
    #[serde(default = "defaults::post")]
    pub post: String,

    /// Attribute of the post container holding its identifier
    #[serde(default = "defaults::id_attribute")]
    pub id_attribute: String,

    /// Selector for the author element within a post
    #[serde(default = "defaults::author")]
    pub author: String,

    /// Selector for the message body within a post
    #[serde(default = "defaults::content")]
    pub content: String,
}

impl SelectorConfig {
    /// Check that no selector is blank.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("selectors.thread_link", &self.thread_link),
            ("selectors.post", &self.post),
            ("selectors.id_attribute", &self.id_attribute),
            ("selectors.author", &self.author),
            ("selectors.content", &self.content),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(AppError::validation(format!("{name} is empty")));
            }
        }
        Ok(())
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            thread_link: defaults::thread_link(),
            thread_link_exclude: defaults::thread_link_exclude(),
            post: defaults::post(),
            id_attribute: defaults::id_attribute(),
            author: defaults::author(),
            content: defaults::content(),
        }
    }
}

mod defaults {
    pub fn thread_link() -> String {
        "a[href*='/thread/']".into()
    }
    pub fn thread_link_exclude() -> Vec<String> {
        vec!["/thread/new/".into()]
    }
    pub fn post() -> String {
        ".post".into()
    }
    pub fn id_attribute() -> String {
        "id".into()
    }
    pub fn author() -> String {
        "a.user-link".into()
    }
    pub fn content() -> String {
        "div.message".into()
    }
}
