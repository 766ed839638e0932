//! Serde helpers for identifiers that arrive either as JSON numbers or strings.

use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::Value;

fn value_to_id<E: de::Error>(value: Value) -> Result<Option<String>, E> {
    match value {
        Value::Null => Ok(None),
        Value::String(text) => Ok(Some(text)),
        Value::Number(number) => Ok(Some(number.to_string())),
        other => Err(E::custom(format!("expected string or number id, got {other}"))),
    }
}

pub fn string_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value_to_id(value)?.ok_or_else(|| de::Error::custom("id must not be null"))
}

pub fn optional_string_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        Some(value) => value_to_id(value),
        None => Ok(None),
    }
}
