use super::detail::parse_timestamp;
use crate::model::StoredReading;
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Readings of one patient on one local calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingGroup {
    pub patient_key: String,
    pub patient_name: String,
    pub date: Option<NaiveDate>,
    pub readings: Vec<StoredReading>,
}

impl ReadingGroup {
    /// Sibling ids handed to the detail view for navigation.
    pub fn ids(&self) -> Vec<u64> {
        self.readings.iter().map(|reading| reading.id).collect()
    }

    pub fn date_label(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "Unknown date".into())
    }
}

/// Groups by patient and local date, newest day first; readings ascend by id.
pub fn group_readings(readings: &[StoredReading]) -> Vec<ReadingGroup> {
    let mut groups: BTreeMap<(Option<NaiveDate>, String), ReadingGroup> = BTreeMap::new();
    for reading in readings {
        let patient_key = reading
            .patient
            .as_ref()
            .map(|patient| patient.key())
            .unwrap_or_default();
        let date = reading
            .created_at
            .as_deref()
            .and_then(parse_timestamp)
            .map(|local| local.date_naive());

        groups
            .entry((date, patient_key.clone()))
            .or_insert_with(|| ReadingGroup {
                patient_key,
                patient_name: reading
                    .patient
                    .as_ref()
                    .and_then(|patient| patient.display_name())
                    .unwrap_or_else(|| "N/A".into()),
                date,
                readings: Vec::new(),
            })
            .readings
            .push(reading.clone());
    }

    let mut grouped: Vec<ReadingGroup> = groups.into_values().rev().collect();
    for group in &mut grouped {
        group.readings.sort_by_key(|reading| reading.id);
    }
    grouped
}
