//! Discord webhook alerting.
//!
//! Operator-visibility channel for external-service failures (persona
//! ingestion, wallet provisioning, scheduler). Delivery is best-effort:
//! a failed webhook post is logged and dropped, never propagated.

use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;

/// Discord rejects message content over 2000 characters
const DISCORD_MAX_CONTENT_CHARS: usize = 2000;

const REQUEST_TIMEOUT_SECS: u64 = 10;

pub struct AlertNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
    error_webhook_url: Option<String>,
}

impl AlertNotifier {
    pub fn new(webhook_url: Option<String>, error_webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            webhook_url,
            error_webhook_url,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.discord_webhook_url.clone(),
            config.discord_error_webhook_url.clone(),
        )
    }

    /// Post to the normal channel
    pub async fn notify(&self, message: &str) {
        self.post(self.webhook_url.as_deref(), message).await;
    }

    /// Post to the error channel (falls back to the normal channel)
    pub async fn notify_error(&self, context: &str, error: &str) {
        let message = format!("🚨 **{}**\n{}", context, error);
        let url = self.error_webhook_url.as_deref().or(self.webhook_url.as_deref());
        self.post(url, &message).await;
    }

    /// Fire-and-forget variant for call sites that must not await delivery
    pub fn notify_error_background(self: &Arc<Self>, context: &str, error: &str) {
        let notifier = Arc::clone(self);
        let context = context.to_string();
        let error = error.to_string();
        tokio::spawn(async move {
            notifier.notify_error(&context, &error).await;
        });
    }

    async fn post(&self, url: Option<&str>, message: &str) {
        let url = match url {
            Some(u) => u,
            None => {
                log::warn!("Alert webhook not configured, dropping alert: {}", message);
                return;
            }
        };

        let content = truncate_for_discord(message);
        let result = self
            .client
            .post(url)
            .json(&serde_json::json!({ "content": content }))
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {}
            Ok(resp) => log::error!("Discord webhook returned {}", resp.status()),
            Err(e) => log::error!("Discord webhook post failed: {}", e),
        }
    }
}

fn truncate_for_discord(message: &str) -> String {
    if message.chars().count() <= DISCORD_MAX_CONTENT_CHARS {
        message.to_string()
    } else {
        let truncated: String = message
            .chars()
            .take(DISCORD_MAX_CONTENT_CHARS - 3)
            .collect();
        format!("{}...", truncated)
    }
}
