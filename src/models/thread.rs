//! Thread registry.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Thread URL to title mapping, as discovered on a board page.
pub type ThreadLinks = BTreeMap<String, String>;

/// Every thread ever discovered, keyed by URL.
///
/// Only grows: threads that drop off the board listing stay monitored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ThreadRegistry {
    threads: ThreadLinks,
}

impl ThreadRegistry {
    pub fn new(threads: ThreadLinks) -> Self {
        Self { threads }
    }

    /// URLs in `current` that are not yet registered.
    pub fn unknown<'a>(&self, current: &'a ThreadLinks) -> Vec<&'a str> {
        current
            .keys()
            .filter(|url| !self.threads.contains_key(*url))
            .map(String::as_str)
            .collect()
    }

    /// Merge a board listing into the registry.
    ///
    /// Known threads get their title refreshed. Returns the URLs that were new.
    pub fn merge(&mut self, current: &ThreadLinks) -> Vec<String> {
        let added: Vec<String> = self
            .unknown(current)
            .into_iter()
            .map(str::to_string)
            .collect();
        if !added.is_empty() {
            self.threads
                .extend(current.iter().map(|(url, title)| (url.clone(), title.clone())));
        }
        added
    }

    pub fn contains(&self, url: &str) -> bool {
        self.threads.contains_key(url)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.threads
            .iter()
            .map(|(url, title)| (url.as_str(), title.as_str()))
    }

    pub fn len(&self) -> usize {
        self.threads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.threads.is_empty()
    }
}
