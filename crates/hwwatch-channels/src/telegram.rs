//! Telegram Bot channel — message delivery via the Bot API.

use async_trait::async_trait;
use hwwatch_core::error::{HwWatchError, Result};
use hwwatch_core::traits::Notifier;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Telegram channel configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "https://api.telegram.org".into()
}
fn default_timeout() -> u64 {
    10
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: default_api_base(),
            timeout_secs: default_timeout(),
        }
    }
}

/// Telegram Bot notifier.
pub struct TelegramNotifier {
    config: TelegramConfig,
    client: reqwest::Client,
}

impl TelegramNotifier {
    pub fn new(config: TelegramConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.config.api_base.trim_end_matches('/'),
            self.config.bot_token,
            method
        )
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Send a plain-text message.
    pub async fn send_message(&self, chat_id: &str, text: &str) -> Result<()> {
        let body = serde_json::json!({
            "chat_id": chat_id,
            "text": text,
        });

        // without_url(): the request URL embeds the bot token.
        let response = self
            .client
            .post(self.api_url("sendMessage"))
            .json(&body)
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| HwWatchError::Delivery(format!("sendMessage failed: {}", e.without_url())))?;

        let status = response.status();
        let result: TelegramApiResponse<serde_json::Value> = response.json().await.map_err(|e| {
            HwWatchError::Delivery(format!("Invalid send response (HTTP {status}): {}", e.without_url()))
        })?;

        if !status.is_success() || !result.ok {
            return Err(HwWatchError::Delivery(format!(
                "Telegram API error {status}: {}",
                result.description.unwrap_or_default()
            )));
        }
        tracing::debug!("✅ Telegram message sent to {chat_id}");
        Ok(())
    }

    /// Get bot info.
    pub async fn get_me(&self) -> Result<TelegramUser> {
        let response = self
            .client
            .get(self.api_url("getMe"))
            .timeout(self.timeout())
            .send()
            .await
            .map_err(|e| HwWatchError::Delivery(format!("getMe failed: {}", e.without_url())))?;
        let body: TelegramApiResponse<TelegramUser> = response
            .json()
            .await
            .map_err(|e| HwWatchError::Delivery(format!("Invalid getMe response: {}", e.without_url())))?;
        if !body.ok {
            return Err(HwWatchError::Delivery(format!(
                "getMe rejected: {}",
                body.description.unwrap_or_default()
            )));
        }
        body.result
            .ok_or_else(|| HwWatchError::Delivery("No bot info".into()))
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn deliver(&self, destination: &str, text: &str) -> Result<()> {
        self.send_message(destination, text).await
    }
}

// --- Telegram API Types ---

#[derive(Debug, Deserialize)]
pub struct TelegramApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    pub username: Option<String>,
}
