//! Seams between the poll loop and the outside world.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

/// Source of raw review-status payloads.
#[async_trait]
pub trait StatusSource: Send + Sync {
    /// Fetch everything that changed since `from_date` (Unix seconds).
    /// The body is returned unvalidated.
    async fn fetch(&self, from_date: i64) -> Result<Value>;
}

/// Delivers a text message to a single destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn name(&self) -> &str;

    async fn deliver(&self, destination: &str, text: &str) -> Result<()>;
}
