//! HwWatch configuration system.
//!
//! Tunables come from an optional TOML file; the three secrets may come from
//! the file too, but environment variables always win.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{HwWatchError, Result};

pub const PRACTICUM_TOKEN_ENV: &str = "PRACTICUM_TOKEN";
pub const TELEGRAM_TOKEN_ENV: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID_ENV: &str = "TELEGRAM_CHAT_ID";

/// Watcher configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// OAuth token for the review-status API.
    #[serde(default)]
    pub practicum_token: String,
    /// Telegram bot token.
    #[serde(default)]
    pub telegram_token: String,
    /// Chat that receives every notification.
    #[serde(default)]
    pub telegram_chat_id: String,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_telegram_api_base")]
    pub telegram_api_base: String,
}

fn default_endpoint() -> String { "https://practicum.yandex.ru/api/user_api/homework_statuses/".into() }
fn default_poll_interval() -> u64 { 600 }
fn default_request_timeout() -> u64 { 30 }
fn default_telegram_api_base() -> String { "https://api.telegram.org".into() }

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            practicum_token: String::new(),
            telegram_token: String::new(),
            telegram_chat_id: String::new(),
            endpoint: default_endpoint(),
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            telegram_api_base: default_telegram_api_base(),
        }
    }
}

impl fmt::Debug for WatcherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatcherConfig")
            .field("practicum_token", &redact(&self.practicum_token))
            .field("telegram_token", &redact(&self.telegram_token))
            .field("telegram_chat_id", &self.telegram_chat_id)
            .field("endpoint", &self.endpoint)
            .field("poll_interval_secs", &self.poll_interval_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("telegram_api_base", &self.telegram_api_base)
            .finish()
    }
}

fn redact(secret: &str) -> &'static str {
    if secret.is_empty() { "<unset>" } else { "<redacted>" }
}

impl WatcherConfig {
    /// Resolve the full configuration: file (explicit or default path), then
    /// environment overrides, then validation.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load config from the default path (~/.hwwatch/config.toml), or defaults
    /// when it does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HwWatchError::ConfigFile(format!("Failed to read {}: {e}", path.display()))
        })?;
        toml::from_str(&content)
            .map_err(|e| HwWatchError::ConfigFile(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn default_path() -> PathBuf {
        Self::home_dir().join("config.toml")
    }

    pub fn home_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".hwwatch")
    }

    /// Override secrets from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_lookup(|key| std::env::var(key).ok());
    }

    /// Override secrets from an arbitrary key lookup. Empty values are ignored.
    pub fn apply_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let slots = [
            (PRACTICUM_TOKEN_ENV, &mut self.practicum_token),
            (TELEGRAM_TOKEN_ENV, &mut self.telegram_token),
            (TELEGRAM_CHAT_ID_ENV, &mut self.telegram_chat_id),
        ];
        for (key, slot) in slots {
            if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
                *slot = value;
            }
        }
    }

    /// Names of required secrets that are still unset.
    pub fn missing_secrets(&self) -> Vec<String> {
        [
            (PRACTICUM_TOKEN_ENV, &self.practicum_token),
            (TELEGRAM_TOKEN_ENV, &self.telegram_token),
            (TELEGRAM_CHAT_ID_ENV, &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(key, _)| key.to_string())
        .collect()
    }

    /// Check that the watcher can start. Every missing secret is logged and
    /// listed in the returned error.
    pub fn validate(&self) -> Result<()> {
        let missing = self.missing_secrets();
        if !missing.is_empty() {
            for key in &missing {
                tracing::error!("Missing required environment variable: {key}");
            }
            return Err(HwWatchError::Configuration { missing });
        }
        if self.poll_interval_secs == 0 {
            return Err(HwWatchError::ConfigFile(
                "poll_interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}
