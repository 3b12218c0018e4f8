//! # HwWatch Watcher
//!
//! The poll-validate-interpret-notify loop for a single tracked homework.
//!
//! ## Architecture
//! ```text
//! Watcher (fixed sleep between cycles)
//!   ├── PracticumClient::fetch(cursor)    → raw JSON
//!   ├── validate(raw)                     → homeworks list
//!   ├── interpret(homeworks[0])           → status message
//!   ├── ChangeTracker::should_notify      → skip repeats
//!   └── Notifier::deliver(chat, message)  → commit attempt
//! ```
//! Any recoverable failure becomes a "Program failure: ..." message that
//! takes the same de-duplicated path.

pub mod client;
pub mod engine;
pub mod interpret;
pub mod tracker;
pub mod validate;

pub use client::PracticumClient;
pub use engine::{CycleOutcome, Delivery, Watcher};
pub use interpret::{interpret, parse_record};
pub use tracker::ChangeTracker;
pub use validate::validate;
