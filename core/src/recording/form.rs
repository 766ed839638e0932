/// Values entered on the save form, kept as typed text until validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadingForm {
    pub patient_id: Option<String>,
    pub record_count: String,
    pub observations: String,
}

impl ReadingForm {
    /// A finite whole number >= 1, or `None`.
    pub fn parsed_record_count(&self) -> Option<u32> {
        let value: f64 = self.record_count.trim().parse().ok()?;
        if !value.is_finite() || value < 1.0 || value.fract() != 0.0 || value > f64::from(u32::MAX) {
            return None;
        }
        Some(value as u32)
    }

    pub fn has_patient(&self) -> bool {
        self.patient_id
            .as_deref()
            .is_some_and(|id| !id.trim().is_empty())
    }
}
