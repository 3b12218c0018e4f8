//! Response shape checks, run before any field of the payload is read.

use hwwatch_core::error::{HwWatchError, Result};
use serde_json::Value;

pub const HOMEWORKS_KEY: &str = "homeworks";
pub const CURRENT_DATE_KEY: &str = "current_date";

/// Return the `homeworks` list of a decoded API payload, possibly empty.
///
/// A missing key is reported as [`HwWatchError::MissingData`]; a value of the
/// wrong type anywhere is [`HwWatchError::Shape`].
pub fn validate(raw: &Value) -> Result<&[Value]> {
    let object = raw
        .as_object()
        .ok_or_else(|| HwWatchError::Shape(format!("expected a JSON object, got {}", kind(raw))))?;
    let homeworks = object
        .get(HOMEWORKS_KEY)
        .ok_or_else(|| HwWatchError::MissingData(format!("key \"{HOMEWORKS_KEY}\" is absent")))?;
    let list = homeworks.as_array().ok_or_else(|| {
        HwWatchError::Shape(format!(
            "\"{HOMEWORKS_KEY}\" is {}, expected an array",
            kind(homeworks)
        ))
    })?;
    tracing::debug!(count = list.len(), "API response validated");
    Ok(list)
}

/// Server-supplied watermark for the next poll, if present and integral.
pub fn watermark(raw: &Value) -> Option<i64> {
    raw.get(CURRENT_DATE_KEY).and_then(Value::as_i64)
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
