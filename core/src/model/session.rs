use super::ids::{optional_string_id, string_id};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-side status of an ECG recording session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionStatus {
    Active,
    Recording,
    Stopped,
    Other(String),
}

impl From<String> for SessionStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "active" => SessionStatus::Active,
            "recording" => SessionStatus::Recording,
            "stopped" => SessionStatus::Stopped,
            _ => SessionStatus::Other(value),
        }
    }
}

impl From<SessionStatus> for String {
    fn from(value: SessionStatus) -> Self {
        value.as_str().to_string()
    }
}

impl SessionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Recording => "recording",
            SessionStatus::Stopped => "stopped",
            SessionStatus::Other(raw) => raw,
        }
    }

    /// Label shown next to the selected patient.
    pub fn label(status: Option<&SessionStatus>) -> String {
        let Some(status) = status else {
            return "ACTIVE".into();
        };
        match status.as_str().to_ascii_lowercase().as_str() {
            "active" | "recording" | "in_progress" => "ACTIVE".into(),
            "stopped" | "inactive" | "finalized" | "finalizada" => "STOPPED".into(),
            other => other.to_uppercase(),
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedDevice {
    pub id: u64,
    #[serde(deserialize_with = "string_id")]
    pub device_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedDoctor {
    #[serde(deserialize_with = "string_id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub identification: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveSessionInfo {
    pub id: u64,
    #[serde(default)]
    pub status: Option<SessionStatus>,
    #[serde(default)]
    pub lead_config: Option<String>,
    #[serde(default)]
    pub sampling_hz: Option<f32>,
    #[serde(default, deserialize_with = "optional_string_id")]
    pub device_id: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
}

/// One candidate patient returned by the active-session lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePatient {
    #[serde(deserialize_with = "string_id")]
    pub patient_id: String,
    #[serde(default)]
    pub patient_name: String,
    #[serde(default)]
    pub patient_last_name: String,
    #[serde(default)]
    pub patient_identification: String,
    #[serde(default)]
    pub appointment_id: Option<u64>,
    #[serde(default)]
    pub clinical_register_id: Option<u64>,
    #[serde(default)]
    pub assigned_device: Option<AssignedDevice>,
    #[serde(default)]
    pub doctor: Option<AssignedDoctor>,
    #[serde(default)]
    pub active_session: Option<ActiveSessionInfo>,
}

impl ActivePatient {
    pub fn display_name(&self) -> String {
        join_name(Some(self.patient_name.as_str()), Some(self.patient_last_name.as_str()))
            .unwrap_or_else(|| self.patient_id.clone())
    }

    pub fn doctor_label(&self) -> String {
        self.doctor
            .as_ref()
            .and_then(|doctor| join_name(doctor.name.as_deref(), doctor.last_name.as_deref()))
            .unwrap_or_default()
    }

    pub fn device_label(&self) -> String {
        match &self.assigned_device {
            Some(device) => format!(
                "{} · ID {}",
                device.name.as_deref().unwrap_or("Device"),
                device.device_id
            ),
            None => "No device assigned".into(),
        }
    }

    pub fn session_label(&self) -> String {
        match &self.active_session {
            Some(session) => SessionStatus::label(session.status.as_ref()),
            None => "UNAVAILABLE".into(),
        }
    }

    pub fn active_session_id(&self) -> Option<u64> {
        self.active_session.as_ref().map(|session| session.id)
    }
}

/// Joins "name last_name", trimming; `None` when both parts are blank.
pub fn join_name(name: Option<&str>, last_name: Option<&str>) -> Option<String> {
    let joined = format!("{} {}", name.unwrap_or(""), last_name.unwrap_or(""));
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Envelope of the active-patient lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActivePatientsEnvelope {
    #[serde(default)]
    pub patients: Option<Vec<ActivePatient>>,
}

/// Body of a session status update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionStatusUpdate {
    pub status: SessionStatus,
}
