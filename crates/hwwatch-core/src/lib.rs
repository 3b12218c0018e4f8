//! # HwWatch Core
//!
//! Shared building blocks for the homework status watcher: configuration,
//! the error taxonomy, domain types, and the collaborator traits the poll
//! loop talks to.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::WatcherConfig;
pub use error::{HwWatchError, Result};
pub use traits::{Notifier, StatusSource};
pub use types::{HomeworkStatus, TrackedRecord};
