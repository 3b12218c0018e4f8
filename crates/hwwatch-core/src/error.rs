//! Error taxonomy for HwWatch.
//!
//! Per-cycle failures (transport, payload shape, record interpretation,
//! delivery) are recoverable: the poll loop reports them and keeps going.
//! Configuration failures are fatal and stop the process before the loop starts.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HwWatchError>;

#[derive(Debug, Error)]
pub enum HwWatchError {
    /// One or more required secrets are absent.
    #[error("missing required environment variables: {}", .missing.join(", "))]
    Configuration { missing: Vec<String> },

    #[error("config file error: {0}")]
    ConfigFile(String),

    /// The request never produced a response.
    #[error("request to {endpoint} (from_date={from_date}) failed: {reason}")]
    Transport {
        endpoint: String,
        from_date: i64,
        reason: String,
    },

    /// The remote service answered with a non-success status.
    #[error("endpoint {endpoint} is unavailable (HTTP {status})")]
    EndpointUnavailable { endpoint: String, status: u16 },

    /// The payload has the wrong type somewhere.
    #[error("malformed API response: {0}")]
    Shape(String),

    /// The payload lacks a key the API contract promises.
    #[error("incomplete API response: {0}")]
    MissingData(String),

    #[error("malformed homework record: {0}")]
    MalformedRecord(String),

    #[error("unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("message delivery failed: {0}")]
    Delivery(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HwWatchError {
    /// Whether the poll loop may report this error and continue with the next cycle.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. }
                | Self::EndpointUnavailable { .. }
                | Self::Shape(_)
                | Self::MissingData(_)
                | Self::MalformedRecord(_)
                | Self::UnknownStatus(_)
                | Self::Delivery(_)
        )
    }
}
