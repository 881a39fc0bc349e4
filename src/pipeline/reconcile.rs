// src/pipeline/reconcile.rs

//! Seen-set reconciliation.
//!
//! One cycle walks the states
//! `DISCOVER_THREADS -> MERGE_REGISTRY -> FETCH_POSTS/FILTER_NEW (per thread)
//! -> DISPATCH_NOTIFICATIONS -> PERSIST`. Failures are contained at the
//! smallest scope: a board failure means zero threads this cycle, a thread
//! failure skips that thread, a delivery failure skips that message.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, Post, SeenSet, ThreadLinks, ThreadRegistry};
use crate::services::{Extractor, Notifier, PageFetcher};
use crate::storage::StateStore;

/// Summary of one reconciliation cycle.
#[derive(Debug, Clone)]
pub struct CycleReport {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Threads listed on the board page this cycle
    pub threads_discovered: usize,
    /// Threads added to the registry this cycle
    pub new_threads: usize,
    /// Registry threads whose pages were fetched
    pub threads_checked: usize,
    pub thread_failures: usize,
    pub new_posts: usize,
    pub delivery_failures: usize,
}

impl CycleReport {
    fn started() -> Self {
        let now = Utc::now();
        Self {
            start_time: now,
            end_time: now,
            threads_discovered: 0,
            new_threads: 0,
            threads_checked: 0,
            thread_failures: 0,
            new_posts: 0,
            delivery_failures: 0,
        }
    }
}

/// Keep only posts whose identifier is not in `seen`.
///
/// A repeated identifier within `posts` is kept once, at its first position.
pub fn filter_new(posts: Vec<Post>, seen: &SeenSet) -> Vec<Post> {
    let mut accepted = HashSet::new();
    posts
        .into_iter()
        .filter(|post| !seen.contains(&post.id) && accepted.insert(post.id.clone()))
        .collect()
}

/// Drives reconciliation cycles against the injected collaborators.
///
/// Owns the in-memory seen set and thread registry; both are loaded from
/// the store once and written back as they change.
pub struct Reconciler<'a> {
    config: &'a Config,
    extractor: &'a Extractor,
    fetcher: &'a dyn PageFetcher,
    notifier: &'a dyn Notifier,
    store: &'a dyn StateStore,
    seen: SeenSet,
    registry: ThreadRegistry,
}

impl<'a> Reconciler<'a> {
    /// Load persisted state and build a reconciler.
    pub async fn load(
        config: &'a Config,
        extractor: &'a Extractor,
        fetcher: &'a dyn PageFetcher,
        notifier: &'a dyn Notifier,
        store: &'a dyn StateStore,
    ) -> Self {
        let seen = store.load_seen().await;
        let registry = store.load_threads().await;

        log::info!("Loaded {} previously seen posts", seen.len());
        log::info!("Monitoring {} known threads", registry.len());

        Self {
            config,
            extractor,
            fetcher,
            notifier,
            store,
            seen,
            registry,
        }
    }

    pub fn seen(&self) -> &SeenSet {
        &self.seen
    }

    pub fn registry(&self) -> &ThreadRegistry {
        &self.registry
    }

    /// Run one full cycle.
    ///
    /// Registry growth is persisted before any thread is fetched, so it
    /// survives a failure later in the cycle.
    pub async fn run_cycle(&mut self) -> Result<CycleReport> {
        let mut report = CycleReport::started();

        let current = self.discover_threads().await;
        report.threads_discovered = current.len();
        report.new_threads = self.merge_registry(&current).await;

        let candidates = self.collect_posts(&mut report).await;
        let new_posts = filter_new(candidates, &self.seen);
        report.new_posts = new_posts.len();

        report.delivery_failures = self.dispatch(&new_posts).await;

        if new_posts.is_empty() {
            log::info!("No new posts found");
        } else {
            self.store.save_seen(&self.seen).await?;
            log::info!(
                "Processed {} new posts. Total seen: {}",
                new_posts.len(),
                self.seen.len()
            );
        }

        report.end_time = Utc::now();
        Ok(report)
    }

    /// Fetch the board page and extract its thread links.
    ///
    /// Any failure counts as zero threads found.
    async fn discover_threads(&self) -> ThreadLinks {
        let board_url = &self.config.board.url;
        log::info!("Fetching thread URLs from {}", board_url);

        let html = match self.fetcher.render(board_url).await {
            Ok(html) => html,
            Err(e) => {
                log::error!("Failed to fetch board page: {}", e);
                return ThreadLinks::new();
            }
        };
        log::debug!("Board page HTML length: {} bytes", html.len());
        log::debug!(
            "Board page title: {}",
            self.extractor.page_title(&html).as_deref().unwrap_or("<none>")
        );

        match self.extractor.extract_thread_links(&html, board_url) {
            Ok(links) => {
                log::info!("Found {} threads on the board", links.len());
                links
            }
            Err(e) => {
                log::error!("Failed to extract thread links: {}", e);
                ThreadLinks::new()
            }
        }
    }

    /// Merge the board listing into the registry; returns the number added.
    async fn merge_registry(&mut self, current: &ThreadLinks) -> usize {
        let added = self.registry.merge(current);
        if added.is_empty() {
            return 0;
        }

        log::info!("Found {} new threads to monitor", added.len());
        for url in &added {
            log::debug!("New thread: {}", url);
        }
        if let Err(e) = self.store.save_threads(&self.registry).await {
            log::error!("Failed to save thread registry: {}", e);
        }
        added.len()
    }

    /// Fetch and extract posts from every registered thread.
    async fn collect_posts(&self, report: &mut CycleReport) -> Vec<Post> {
        let mut posts = Vec::new();

        for (url, title) in self.registry.iter() {
            report.threads_checked += 1;
            log::info!("Checking thread: {}", title);

            match self.fetcher.render(url).await {
                Ok(html) => {
                    let thread_posts = self.extractor.extract_posts(&html, url, title);
                    log::info!("Found {} posts in '{}'", thread_posts.len(), title);
                    posts.extend(thread_posts);
                }
                Err(e) => {
                    report.thread_failures += 1;
                    log::error!("Failed to fetch posts from {}: {}", url, e);
                }
            }
        }

        posts
    }

    /// Mark each post seen and send its notification; returns failed deliveries.
    async fn dispatch(&mut self, posts: &[Post]) -> usize {
        let notifier = &self.config.notifier;
        let delay = Duration::from_millis(notifier.dispatch_delay_ms);
        let mut failures = 0;

        for (idx, post) in posts.iter().enumerate() {
            if idx > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            log::info!(
                "[NEW POST] {} - {}: {}",
                post.thread_title,
                post.author,
                post.preview(60)
            );
            self.seen.insert(post.id.clone());

            let message = post.format(&notifier.template, notifier.content_limit);
            if let Err(e) = self.notifier.notify(&message).await {
                failures += 1;
                log::warn!(
                    "Failed to deliver notification for {} via {}: {}",
                    post.deep_link(),
                    self.notifier.name(),
                    e
                );
            }
        }

        failures
    }
}
