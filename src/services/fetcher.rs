// src/services/fetcher.rs

//! Page fetcher service.
//!
//! Retrieves the HTML of a page, either rendered by a headless browser or
//! fetched with a plain HTTP request.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{FetcherBackend, FetcherConfig};
use crate::utils::http::{create_async_client, fetch_page_async};

/// Trait for page fetchers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Return the HTML of the page at `url`.
    async fn render(&self, url: &str) -> Result<String>;
}

/// Build the fetcher selected by the configuration.
pub fn build_fetcher(config: &FetcherConfig) -> Result<Box<dyn PageFetcher>> {
    match config.backend {
        FetcherBackend::Http => Ok(Box::new(HttpFetcher::new(config)?)),
        #[cfg(feature = "chrome")]
        FetcherBackend::Chrome => Ok(Box::new(chrome::ChromeFetcher::new(config.clone()))),
        #[cfg(not(feature = "chrome"))]
        FetcherBackend::Chrome => Err(crate::error::AppError::config(
            "fetcher.backend = \"chrome\" requires the `chrome` feature",
        )),
    }
}

/// Fetches pages with a plain HTTP GET; no JavaScript is executed.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn render(&self, url: &str) -> Result<String> {
        fetch_page_async(&self.client, url).await
    }
}

#[cfg(feature = "chrome")]
pub use chrome::ChromeFetcher;

#[cfg(feature = "chrome")]
mod chrome {
    use std::ffi::OsStr;
    use std::time::Duration;

    use async_trait::async_trait;
    use headless_chrome::{Browser, LaunchOptions};
    use tokio::task::spawn_blocking;

    use super::PageFetcher;
    use crate::error::{AppError, Result};
    use crate::models::FetcherConfig;

    /// Renders pages in headless Chrome.
    ///
    /// Every call launches its own browser with a throwaway profile, so no
    /// cookies or storage leak between pages. The browser process is killed
    /// when the handle drops at the end of the call, on success or failure.
    pub struct ChromeFetcher {
        config: FetcherConfig,
    }

    impl ChromeFetcher {
        pub fn new(config: FetcherConfig) -> Self {
            Self { config }
        }
    }

    #[async_trait]
    impl PageFetcher for ChromeFetcher {
        async fn render(&self, url: &str) -> Result<String> {
            let config = self.config.clone();
            let target = url.to_string();

            spawn_blocking(move || render_blocking(&config, &target))
                .await
                .map_err(|e| AppError::fetch(url, format!("render task failed: {e}")))?
        }
    }

    fn render_blocking(config: &FetcherConfig, url: &str) -> Result<String> {
        let timeout = Duration::from_millis(config.navigation_timeout_ms);
        let settle = Duration::from_millis(config.settle_ms);

        let defaults = LaunchOptions::default();
        let launch = LaunchOptions {
            headless: config.headless,
            args: config.args.iter().map(OsStr::new).collect(),
            // The browser must outlive navigation plus settle time.
            idle_browser_timeout: (timeout + settle).max(defaults.idle_browser_timeout),
            ..defaults
        };
        let browser = Browser::new(launch)
            .map_err(|e| AppError::fetch(url, format!("browser launch failed: {e}")))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AppError::fetch(url, format!("tab creation failed: {e}")))?;
        tab.set_default_timeout(timeout);
        tab.set_user_agent(&config.user_agent, None, None)
            .map_err(|e| AppError::fetch(url, e))?;

        tab.navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| AppError::fetch(url, format!("navigation failed: {e}")))?;

        if !settle.is_zero() {
            std::thread::sleep(settle);
        }

        let html = tab.get_content().map_err(|e| AppError::fetch(url, e))?;
        log::debug!("Rendered {} ({} bytes)", url, html.len());
        Ok(html)
    }
}
