//! Telegram Bot API sender.
//!
//! Posts messages to a single chat through `sendMessage`. One attempt per
//! message, bounded by the configured timeout; no retry and no queueing.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::TelegramConfig;
use crate::errors::NotificationError;
use crate::notify::NotificationMessage;

/// Telegram Bot API notifier.
pub struct TelegramNotifier {
    send_url: String,
    chat_id: String,
    http: reqwest::Client,
}

impl TelegramNotifier {
    /// Create a notifier for the configured bot and chat.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotificationError> {
        info!(chat_id = %config.chat_id, "initializing Telegram notifier");
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.bot_token
            ),
            chat_id: config.chat_id.clone(),
            http,
        })
    }

    /// Send a message to the configured chat.
    pub async fn send(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
        debug!(len = message.text.len(), "sending Telegram message");

        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": message.text,
            "parse_mode": message.parse_mode,
            "disable_web_page_preview": true,
        });

        let resp = self
            .http
            .post(&self.send_url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                // The URL embeds the bot token; keep it out of the logs.
                let e = e.without_url();
                warn!(error = %e, "failed to send Telegram notification");
                NotificationError::from(e)
            })?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            warn!(status = %status, body = %body, "Telegram API returned error");
            return Err(NotificationError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        info!("Telegram notification sent successfully");
        Ok(())
    }
}
