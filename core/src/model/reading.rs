use super::session::join_name;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Stored sample payload as it may arrive from the readings API.
///
/// The server has historically stored the capture as a plain array, as a
/// JSON-encoded text column, or wrapped in an object with a `samples` field.
#[derive(Debug, Clone, PartialEq)]
pub enum RawSamples {
    Array(Vec<Value>),
    Encoded(String),
    Wrapped(Value),
    Missing,
}

impl From<Option<Value>> for RawSamples {
    fn from(value: Option<Value>) -> Self {
        match value {
            Some(Value::Array(items)) => RawSamples::Array(items),
            Some(Value::String(text)) => RawSamples::Encoded(text),
            Some(Value::Object(mut fields)) => match fields.remove("samples") {
                Some(samples) => RawSamples::Wrapped(samples),
                None => RawSamples::Missing,
            },
            _ => RawSamples::Missing,
        }
    }
}

impl From<Value> for RawSamples {
    fn from(value: Value) -> Self {
        RawSamples::from(Some(value))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonRef {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identification: Option<String>,
}

impl PersonRef {
    pub fn display_name(&self) -> Option<String> {
        join_name(self.name.as_deref(), self.last_name.as_deref())
    }

    /// Stable grouping key for the patient, whatever JSON type the id had.
    pub fn key(&self) -> String {
        match &self.id {
            Some(Value::String(text)) => text.clone(),
            Some(Value::Null) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }
}

/// A persisted reading fetched for playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredReading {
    pub id: u64,
    #[serde(rename = "ecg_session_id")]
    pub session_id: u64,
    #[serde(default)]
    pub record_count: u32,
    #[serde(default)]
    pub observations: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub patient: Option<PersonRef>,
    #[serde(default)]
    pub doctor: Option<PersonRef>,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub sample_rate: Option<f64>,
}

impl StoredReading {
    pub fn raw_samples(&self) -> RawSamples {
        RawSamples::from(self.data.clone())
    }
}

/// Payload submitted to the reading-persistence collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReading {
    pub ecg_session_id: u64,
    pub record_count: u32,
    pub observations: String,
    pub data: Vec<f32>,
    pub sample_rate: u32,
}

/// Acknowledgement returned by the persistence collaborator.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SaveAck {
    #[serde(default)]
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<StoredReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingEnvelope {
    #[serde(default)]
    pub reading: Option<StoredReading>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReadingsEnvelope {
    #[serde(default)]
    pub readings: Vec<StoredReading>,
}
