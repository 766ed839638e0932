use crate::api::ApiError;
use crate::config::StoredViewConfig;
use crate::model::{PersonRef, StoredReading};
use crate::render::StoredWaveformRenderer;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone};

const NOT_AVAILABLE: &str = "N/A";
pub const READING_NOT_FOUND: &str = "Reading not found.";

/// Display-ready view of one stored reading plus its waveform renderer.
#[derive(Debug, Clone)]
pub struct ReadingDetail {
    reading: StoredReading,
    renderer: StoredWaveformRenderer,
}

impl ReadingDetail {
    pub fn new(reading: StoredReading, config: &StoredViewConfig) -> Self {
        let renderer = StoredWaveformRenderer::from_reading(&reading, config);
        Self { reading, renderer }
    }

    pub fn reading(&self) -> &StoredReading {
        &self.reading
    }

    pub fn renderer(&self) -> &StoredWaveformRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut StoredWaveformRenderer {
        &mut self.renderer
    }

    pub fn patient_name(&self) -> String {
        person_name(self.reading.patient.as_ref())
    }

    pub fn patient_identification(&self) -> String {
        self.reading
            .patient
            .as_ref()
            .and_then(|patient| patient.identification.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.into())
    }

    pub fn doctor_name(&self) -> String {
        person_name(self.reading.doctor.as_ref())
    }

    pub fn created_at(&self) -> String {
        format_timestamp(self.reading.created_at.as_deref())
    }

    pub fn observations(&self) -> &str {
        self.reading.observations.as_deref().unwrap_or("")
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.renderer.sample_rate_hz()
    }

    pub fn sample_count(&self) -> usize {
        self.renderer.samples().len()
    }

    /// Captured length at the effective rate, in seconds.
    pub fn duration_secs(&self) -> f32 {
        self.sample_count() as f32 / self.sample_rate_hz().max(1) as f32
    }
}

fn person_name(person: Option<&PersonRef>) -> String {
    person
        .and_then(PersonRef::display_name)
        .unwrap_or_else(|| NOT_AVAILABLE.into())
}

/// Message shown when a reading cannot be loaded.
pub fn load_error_message(err: &ApiError) -> String {
    err.user_message("Error loading the ECG reading.")
}

/// Parses RFC 3339 or a plain `YYYY-MM-DD HH:MM:SS` (read as local time).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Local));
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
}

/// Local date-time when parseable, the raw text otherwise, "N/A" when absent.
pub fn format_timestamp(value: Option<&str>) -> String {
    match value.map(str::trim).filter(|text| !text.is_empty()) {
        None => NOT_AVAILABLE.into(),
        Some(text) => match parse_timestamp(text) {
            Some(local) => local.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => text.to_string(),
        },
    }
}
