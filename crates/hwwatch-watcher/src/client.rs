//! Review-status API client.
//!
//! One GET per call, no retries. Retrying happens at cycle granularity in the
//! poll loop.

use async_trait::async_trait;
use hwwatch_core::config::WatcherConfig;
use hwwatch_core::error::{HwWatchError, Result};
use hwwatch_core::traits::StatusSource;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;
use std::time::Duration;

pub struct PracticumClient {
    endpoint: String,
    token: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl PracticumClient {
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            token: token.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &WatcherConfig) -> Self {
        Self::new(
            config.endpoint.clone(),
            config.practicum_token.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, from_date: i64, e: reqwest::Error) -> HwWatchError {
        HwWatchError::Transport {
            endpoint: self.endpoint.clone(),
            from_date,
            reason: e.without_url().to_string(),
        }
    }
}

#[async_trait]
impl StatusSource for PracticumClient {
    async fn fetch(&self, from_date: i64) -> Result<Value> {
        tracing::debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(from_date, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HwWatchError::EndpointUnavailable {
                endpoint: self.endpoint.clone(),
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(from_date, e))?;
        serde_json::from_str(&body)
            .map_err(|e| HwWatchError::Shape(format!("response body is not valid JSON: {e}")))
    }
}
