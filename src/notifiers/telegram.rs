use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::Notifier;
use crate::config::TelegramConfig;
use crate::utils::error::{AppError, Result};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    description: Option<String>,
    result: Option<SentMessage>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

/// Sends plain text through the Telegram Bot API `sendMessage` method.
pub struct TelegramNotifier {
    client: Client,
    api_base: String,
    bot_token: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Result<Self> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", self.api_base, self.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        debug!(chat_id = recipient, "Sending Telegram message");

        // reqwest errors carry the URL, and the URL carries the bot token.
        let response = self
            .client
            .post(self.endpoint())
            .form(&[("chat_id", recipient), ("text", text)])
            .send()
            .await
            .map_err(|e| AppError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "Telegram API returned status {}: {}",
                status, body
            )));
        }

        match response.json::<SendMessageResponse>().await {
            Ok(SendMessageResponse { ok: false, description, .. }) => {
                return Err(AppError::Delivery(format!(
                    "Telegram API rejected message: {}",
                    description.unwrap_or_else(|| "no description".to_string())
                )));
            }
            Ok(body) => {
                info!(
                    message_id = body.result.map(|m| m.message_id),
                    "Telegram message sent"
                );
            }
            Err(e) => {
                debug!(error = %e.without_url(), "Telegram replied 2xx with an unexpected body");
            }
        }

        Ok(())
    }
}
