use crate::model::{ActivePatient, SessionStatus};

/// Patient and session selection scoped to one recording screen.
///
/// Lives exactly as long as the controller that owns it; nothing is shared
/// with other screens except through explicit navigation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    patient: Option<ActivePatient>,
    status_label: String,
}

impl SessionContext {
    pub fn select(patients: &[ActivePatient], patient_id: &str) -> Self {
        let patient = patients
            .iter()
            .find(|patient| patient.patient_id == patient_id)
            .cloned();
        let status_label = match &patient {
            Some(patient) => patient.session_label(),
            None => "UNAVAILABLE".into(),
        };
        Self {
            patient,
            status_label,
        }
    }

    pub fn patient(&self) -> Option<&ActivePatient> {
        self.patient.as_ref()
    }

    pub fn session_id(&self) -> Option<u64> {
        self.patient.as_ref()?.active_session_id()
    }

    /// Feed filter for the live view: the assigned device's identifier.
    pub fn device_id(&self) -> Option<&str> {
        self.patient
            .as_ref()?
            .assigned_device
            .as_ref()
            .map(|device| device.device_id.as_str())
    }

    pub fn has_assigned_device(&self) -> bool {
        self.patient
            .as_ref()
            .is_some_and(|patient| patient.assigned_device.is_some())
    }

    pub fn doctor_label(&self) -> String {
        self.patient
            .as_ref()
            .map(ActivePatient::doctor_label)
            .unwrap_or_default()
    }

    pub fn device_label(&self) -> String {
        self.patient
            .as_ref()
            .map(ActivePatient::device_label)
            .unwrap_or_default()
    }

    pub fn status_label(&self) -> &str {
        &self.status_label
    }

    pub fn set_status(&mut self, status: &SessionStatus) {
        self.status_label = SessionStatus::label(Some(status));
    }
}
