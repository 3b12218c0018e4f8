//! Maps a raw homework record to its notification text.

use hwwatch_core::error::{HwWatchError, Result};
use hwwatch_core::types::{HomeworkStatus, TrackedRecord};
use serde_json::Value;

pub const NAME_KEY: &str = "homework_name";
pub const STATUS_KEY: &str = "status";

/// Parse a single entry of the `homeworks` list.
pub fn parse_record(record: &Value) -> Result<TrackedRecord> {
    let name = record
        .get(NAME_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| HwWatchError::MalformedRecord(format!("no \"{NAME_KEY}\" in {record}")))?;

    let code = match record.get(STATUS_KEY) {
        None | Some(Value::Null) => {
            return Err(HwWatchError::UnknownStatus("status is missing".into()));
        }
        Some(Value::String(code)) if code.is_empty() => {
            return Err(HwWatchError::UnknownStatus("status is empty".into()));
        }
        Some(Value::String(code)) => code.as_str(),
        Some(other) => {
            return Err(HwWatchError::UnknownStatus(format!("status is not a string: {other}")));
        }
    };

    let status = HomeworkStatus::from_code(code)
        .ok_or_else(|| HwWatchError::UnknownStatus(format!("\"{code}\"")))?;

    Ok(TrackedRecord {
        name: name.to_string(),
        status,
    })
}

/// Notification text for a raw record.
pub fn interpret(record: &Value) -> Result<String> {
    let parsed = parse_record(record)?;
    tracing::debug!(homework = %parsed.name, status = %parsed.status, "Homework status parsed");
    Ok(parsed.message())
}
