// src/services/notifier.rs

//! Notification delivery.
//!
//! Messages go to a Discord-compatible webhook. Failed deliveries are
//! reported to the caller and never retried.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::NotifierConfig;

/// Trait for notification channels.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Get the name of this channel.
    fn name(&self) -> &'static str;

    /// Deliver one message.
    async fn notify(&self, message: &str) -> Result<()>;
}

/// Build the notifier selected by the configuration.
///
/// An empty webhook URL yields a notifier that only logs.
pub fn build_notifier(config: &NotifierConfig) -> Result<Box<dyn Notifier>> {
    if config.enabled() {
        Ok(Box::new(WebhookNotifier::new(config)?))
    } else {
        log::warn!("notifier.webhook_url is empty, notifications will only be logged");
        Ok(Box::new(LogNotifier))
    }
}

#[derive(Serialize)]
struct WebhookPayload<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<&'a str>,
}

/// Posts messages to a webhook endpoint.
pub struct WebhookNotifier {
    webhook_url: String,
    username: Option<String>,
    client: reqwest::Client,
}

impl WebhookNotifier {
    /// Each delivery is bounded by `config.timeout_ms`.
    pub fn new(config: &NotifierConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;

        Ok(Self {
            webhook_url: config.webhook_url.clone(),
            username: config.username.clone(),
            client,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &'static str {
        "webhook"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        let payload = WebhookPayload {
            content: message,
            username: self.username.as_deref(),
        };

        let res = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::delivery(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(AppError::delivery(format!(
                "webhook returned {status}: {body}"
            )));
        }

        Ok(())
    }
}

/// Writes messages to the log instead of delivering them.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &'static str {
        "log"
    }

    async fn notify(&self, message: &str) -> Result<()> {
        log::info!("Notification (not delivered):\n{}", message);
        Ok(())
    }
}
