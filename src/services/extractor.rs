// src/services/extractor.rs

//! HTML extraction service.
//!
//! Turns rendered board and thread pages into thread links and posts using
//! the configured CSS selectors. Missing substructure is skipped, never an
//! error: one malformed post must not cost the rest of the page.

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Post, SelectorConfig, ThreadLinks};
use crate::utils::resolve_url;

/// Compiled selectors for board and thread pages.
#[derive(Debug)]
pub struct Extractor {
    title: Selector,
    thread_link: Selector,
    thread_link_exclude: Vec<String>,
    post: Selector,
    id_attribute: String,
    author: Selector,
    content: Selector,
}

impl Extractor {
    /// Compile the configured selectors.
    pub fn new(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            title: Self::parse_selector("title")?,
            thread_link: Self::parse_selector(&config.thread_link)?,
            thread_link_exclude: config.thread_link_exclude.clone(),
            post: Self::parse_selector(&config.post)?,
            id_attribute: config.id_attribute.clone(),
            author: Self::parse_selector(&config.author)?,
            content: Self::parse_selector(&config.content)?,
        })
    }

    /// Extract thread links from a board page.
    ///
    /// Relative hrefs are resolved against `base_url`; a later duplicate URL
    /// overwrites the earlier title.
    pub fn extract_thread_links(&self, html: &str, base_url: &str) -> Result<ThreadLinks> {
        let base = Url::parse(base_url)
            .map_err(|e| AppError::parse(format!("invalid base URL {base_url}: {e}")))?;
        let document = Html::parse_document(html);
        let mut links = ThreadLinks::new();

        for anchor in document.select(&self.thread_link) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            if self.is_excluded(href) {
                continue;
            }
            links.insert(resolve_url(&base, href), Self::text_of(anchor));
        }

        log::debug!("Extracted {} thread links from {}", links.len(), base_url);
        Ok(links)
    }

    /// Trimmed `<title>` of a page, if present and non-empty.
    pub fn page_title(&self, html: &str) -> Option<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.title)
            .next()
            .map(Self::text_of)
            .filter(|title| !title.is_empty())
    }

    /// Extract posts from a thread page, in document order.
    pub fn extract_posts(&self, html: &str, thread_url: &str, thread_title: &str) -> Vec<Post> {
        let document = Html::parse_document(html);

        document
            .select(&self.post)
            .enumerate()
            .filter_map(|(idx, container)| {
                let post = self.parse_post(container, thread_url, thread_title);
                if post.is_none() {
                    log::debug!("Skipping incomplete post #{} in {}", idx, thread_url);
                }
                post
            })
            .collect()
    }

    fn parse_post(
        &self,
        container: ElementRef<'_>,
        thread_url: &str,
        thread_title: &str,
    ) -> Option<Post> {
        let id = container
            .value()
            .attr(&self.id_attribute)
            .filter(|id| !id.trim().is_empty())?;
        let author = container.select(&self.author).next()?;
        let content = container.select(&self.content).next()?;

        Some(Post {
            id: id.trim().to_string(),
            author: Self::text_of(author),
            content: Self::text_of(content),
            thread_url: thread_url.to_string(),
            thread_title: thread_title.to_string(),
        })
    }

    fn is_excluded(&self, href: &str) -> bool {
        self.thread_link_exclude
            .iter()
            .any(|pattern| !pattern.is_empty() && href.contains(pattern.as_str()))
    }

    fn text_of(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_string()
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}
