//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::SelectorConfig;

/// Environment variable overriding `notifier.webhook_url`.
pub const ENV_WEBHOOK_URL: &str = "BOARD_WATCHER_WEBHOOK_URL";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Board to watch
    #[serde(default)]
    pub board: BoardConfig,

    /// Poll scheduling
    #[serde(default)]
    pub poll: PollConfig,

    /// Page rendering settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Notification delivery settings
    #[serde(default)]
    pub notifier: NotifierConfig,

    /// Persisted state locations
    #[serde(default)]
    pub paths: PathsConfig,

    /// CSS selectors for board and thread pages
    #[serde(default)]
    pub selectors: SelectorConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            let mut config = Self::default();
            config.apply_env();
            config
        })
    }

    /// Apply environment overrides.
    fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(ENV_WEBHOOK_URL) {
            if !url.trim().is_empty() {
                self.notifier.webhook_url = url;
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.board.url)
            .map_err(|e| AppError::validation(format!("board.url is invalid: {e}")))?;
        if self.notifier.enabled() {
            url::Url::parse(&self.notifier.webhook_url).map_err(|e| {
                AppError::validation(format!("notifier.webhook_url is invalid: {e}"))
            })?;
        }
        if self.poll.interval_secs == 0 {
            return Err(AppError::validation("poll.interval_secs must be > 0"));
        }
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::validation("fetcher.user_agent is empty"));
        }
        if self.fetcher.navigation_timeout_ms == 0 {
            return Err(AppError::validation(
                "fetcher.navigation_timeout_ms must be > 0",
            ));
        }
        if self.notifier.timeout_ms == 0 {
            return Err(AppError::validation("notifier.timeout_ms must be > 0"));
        }
        if self.notifier.content_limit == 0 {
            return Err(AppError::validation("notifier.content_limit must be > 0"));
        }
        if self.notifier.template.trim().is_empty() {
            return Err(AppError::validation("notifier.template is empty"));
        }
        if self.paths.seen_file.as_os_str().is_empty()
            || self.paths.threads_file.as_os_str().is_empty()
        {
            return Err(AppError::validation("paths must not be empty"));
        }
        self.selectors.validate()
    }
}

/// Board page location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// URL of the board listing page
    #[serde(default = "defaults::board_url")]
    pub url: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            url: defaults::board_url(),
        }
    }
}

/// Poll scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Seconds to sleep between cycles
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
        }
    }
}

/// Which page fetcher implementation to use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FetcherBackend {
    /// Headless Chrome, renders JavaScript
    #[default]
    Chrome,
    /// Plain HTTP GET
    Http,
}

/// Page rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    #[serde(default)]
    pub backend: FetcherBackend,

    /// User-Agent presented to the forum
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Navigation (or request) timeout in milliseconds
    #[serde(default = "defaults::navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Extra wait after navigation for late scripts, in milliseconds
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,

    /// Run the browser without a window
    #[serde(default = "defaults::headless")]
    pub headless: bool,

    /// Extra browser launch arguments
    #[serde(default = "defaults::browser_args")]
    pub args: Vec<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            backend: FetcherBackend::default(),
            user_agent: defaults::user_agent(),
            navigation_timeout_ms: defaults::navigation_timeout(),
            settle_ms: defaults::settle(),
            headless: defaults::headless(),
            args: defaults::browser_args(),
        }
    }
}

/// Notification delivery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Webhook endpoint; empty disables delivery
    #[serde(default)]
    pub webhook_url: String,

    /// Display name sent along with each message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Pause between consecutive dispatches in milliseconds
    #[serde(default = "defaults::dispatch_delay")]
    pub dispatch_delay_ms: u64,

    /// Request timeout for one delivery in milliseconds
    #[serde(default = "defaults::delivery_timeout")]
    pub timeout_ms: u64,

    /// Maximum grapheme clusters of post content included in a message
    #[serde(default = "defaults::content_limit")]
    pub content_limit: usize,

    /// Message template.
    ///
    /// Placeholders: `{author}`, `{thread_title}`, `{content}`, `{link}`, `{post_id}`
    #[serde(default = "defaults::template")]
    pub template: String,
}

impl NotifierConfig {
    pub fn enabled(&self) -> bool {
        !self.webhook_url.trim().is_empty()
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: None,
            dispatch_delay_ms: defaults::dispatch_delay(),
            timeout_ms: defaults::delivery_timeout(),
            content_limit: defaults::content_limit(),
            template: defaults::template(),
        }
    }
}

/// Persisted state file locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "defaults::seen_file")]
    pub seen_file: PathBuf,

    #[serde(default = "defaults::threads_file")]
    pub threads_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seen_file: defaults::seen_file(),
            threads_file: defaults::threads_file(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    pub fn board_url() -> String {
        "https://vusa.forums.net/board/21/news".into()
    }
    pub fn interval() -> u64 {
        300
    }

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".into()
    }
    pub fn navigation_timeout() -> u64 {
        30_000
    }
    pub fn settle() -> u64 {
        2_000
    }
    pub fn headless() -> bool {
        true
    }
    pub fn browser_args() -> Vec<String> {
        vec!["--no-sandbox".into(), "--disable-dev-shm-usage".into()]
    }

    // Notifier defaults
    pub fn dispatch_delay() -> u64 {
        1_000
    }
    pub fn delivery_timeout() -> u64 {
        10_000
    }
    pub fn content_limit() -> usize {
        200
    }
    pub fn template() -> String {
        "🆕 **{author}** replied in **{thread_title}**:\n{content}\n\n🔗 [View Post]({link})"
            .into()
    }

    // Path defaults
    pub fn seen_file() -> PathBuf {
        PathBuf::from("seen_posts.json")
    }
    pub fn threads_file() -> PathBuf {
        PathBuf::from("monitored_threads.json")
    }
}
