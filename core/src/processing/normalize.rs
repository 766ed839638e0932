//! Normalization of stored sample payloads into a flat numeric sequence.
//!
//! Every encoding is tolerated; anything unreadable collapses to an empty
//! sequence so playback degrades to the "no data" view instead of failing.

use crate::model::RawSamples;
use log::warn;
use serde_json::Value;

/// Flattens any accepted payload encoding into finite samples.
pub fn normalize_samples(raw: &RawSamples) -> Vec<f32> {
    match raw {
        RawSamples::Array(items) => coerce_all(items),
        RawSamples::Encoded(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Array(items)) => coerce_all(&items),
            Ok(Value::Object(fields)) => match fields.get("samples") {
                Some(Value::Array(items)) => coerce_all(items),
                _ => Vec::new(),
            },
            Ok(_) => Vec::new(),
            Err(err) => {
                warn!("stored ECG payload is not valid JSON: {err}");
                Vec::new()
            }
        },
        RawSamples::Wrapped(Value::Array(items)) => coerce_all(items),
        RawSamples::Wrapped(_) | RawSamples::Missing => Vec::new(),
    }
}

/// Convenience over an optional raw JSON value as carried by `StoredReading::data`.
pub fn normalize_value(value: Option<&Value>) -> Vec<f32> {
    normalize_samples(&RawSamples::from(value.cloned()))
}

fn coerce_all(items: &[Value]) -> Vec<f32> {
    items
        .iter()
        .filter_map(coerce)
        .filter(|value| value.is_finite())
        .collect()
}

/// Numeric coercion of a single stored element; containers are not numbers.
fn coerce(value: &Value) -> Option<f32> {
    match value {
        Value::Number(number) => number.as_f64().map(|v| v as f32),
        Value::String(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok().map(|v| v as f32)
            }
        }
        Value::Bool(flag) => Some(if *flag { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(_) | Value::Object(_) => None,
    }
}
