use chrono::Utc;
use ecgcore::model::{ActivePatient, NewReading, PersonRef, SessionStatus, StoredReading};
use serde_json::Value;
use std::collections::HashMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("ECG session {0} not found")]
    UnknownSession(u64),
    #[error("record_count must be greater than or equal to 1")]
    InvalidRecordCount,
    #[error("could not encode samples: {0}")]
    Encoding(String),
}

/// In-memory stand-in for the clinic backend.
///
/// Readings keep their samples as a JSON-encoded string, the way the
/// production database column does.
#[derive(Debug, Default)]
pub struct ClinicStore {
    patients: Vec<ActivePatient>,
    session_status: HashMap<u64, SessionStatus>,
    readings: Vec<StoredReading>,
    next_reading_id: u64,
}

impl ClinicStore {
    pub fn new(patients: Vec<ActivePatient>) -> Self {
        let session_status = patients
            .iter()
            .filter_map(|patient| patient.active_session.as_ref())
            .map(|session| {
                (
                    session.id,
                    session.status.clone().unwrap_or(SessionStatus::Active),
                )
            })
            .collect();
        Self {
            patients,
            session_status,
            readings: Vec::new(),
            next_reading_id: 1,
        }
    }

    /// Patients with their sessions' current status.
    pub fn active_patients(&self) -> Vec<ActivePatient> {
        self.patients
            .iter()
            .cloned()
            .map(|mut patient| {
                if let Some(session) = patient.active_session.as_mut() {
                    session.status = self.session_status.get(&session.id).cloned();
                }
                patient
            })
            .collect()
    }

    pub fn session_status(&self, session_id: u64) -> Option<&SessionStatus> {
        self.session_status.get(&session_id)
    }

    pub fn update_session(
        &mut self,
        session_id: u64,
        status: SessionStatus,
    ) -> Result<(), StoreError> {
        let entry = self
            .session_status
            .get_mut(&session_id)
            .ok_or(StoreError::UnknownSession(session_id))?;
        *entry = status;
        Ok(())
    }

    pub fn create_reading(&mut self, reading: NewReading) -> Result<StoredReading, StoreError> {
        if !self.session_status.contains_key(&reading.ecg_session_id) {
            return Err(StoreError::UnknownSession(reading.ecg_session_id));
        }
        if reading.record_count < 1 {
            return Err(StoreError::InvalidRecordCount);
        }
        let encoded = serde_json::to_string(&reading.data)
            .map_err(|err| StoreError::Encoding(err.to_string()))?;

        let owner = self.session_owner(reading.ecg_session_id);
        let stored = StoredReading {
            id: self.next_reading_id,
            session_id: reading.ecg_session_id,
            record_count: reading.record_count,
            observations: Some(reading.observations),
            created_at: Some(Utc::now().to_rfc3339()),
            patient: owner.map(|patient| PersonRef {
                id: Some(Value::from(patient.patient_id.clone())),
                name: Some(patient.patient_name.clone()),
                last_name: Some(patient.patient_last_name.clone()),
                identification: Some(patient.patient_identification.clone()),
            }),
            doctor: owner
                .and_then(|patient| patient.doctor.as_ref())
                .map(|doctor| PersonRef {
                    id: Some(Value::from(doctor.id.clone())),
                    name: doctor.name.clone(),
                    last_name: doctor.last_name.clone(),
                    identification: None,
                }),
            data: Some(Value::String(encoded)),
            sample_rate: Some(f64::from(reading.sample_rate)),
        };
        self.next_reading_id += 1;
        self.readings.push(stored.clone());
        Ok(stored)
    }

    pub fn reading(&self, id: u64) -> Option<&StoredReading> {
        self.readings.iter().find(|reading| reading.id == id)
    }

    /// Newest first.
    pub fn readings(&self) -> Vec<StoredReading> {
        self.readings.iter().rev().cloned().collect()
    }

    fn session_owner(&self, session_id: u64) -> Option<&ActivePatient> {
        self.patients
            .iter()
            .find(|patient| patient.active_session_id() == Some(session_id))
    }
}
