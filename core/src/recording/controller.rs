use super::context::SessionContext;
use super::effects::{Effect, Notice, Rejection};
use super::form::ReadingForm;
use crate::api::ApiError;
use crate::config::RecorderConfig;
use crate::model::{ActivePatient, BlockSummary, NewReading, SaveAck, SessionStatus};
use crate::telemetry::LogManager;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderState {
    Idle,
    Connected,
    Recording,
    /// Terminal; reached through `cancel` or a successful save.
    Disconnected,
}

/// Gates connect/record/save on the selected patient's session and device.
///
/// All transitions are synchronous and return the [`Effect`]s the host must
/// run. The recording timer is a flag plus a host-driven [`tick`](Self::tick),
/// so disarming it is immediate and no tick can land after a stop.
#[derive(Debug)]
pub struct RecordingController {
    config: RecorderConfig,
    state: RecorderState,
    patients: Vec<ActivePatient>,
    selected_patient_id: Option<String>,
    context: SessionContext,
    elapsed_secs: u32,
    timer_armed: bool,
    capture: Vec<f32>,
    capture_rate_hz: Option<u32>,
    current_bpm: f32,
    submitting: bool,
    logger: LogManager,
}

impl RecordingController {
    pub fn new(config: RecorderConfig) -> Self {
        Self {
            config,
            state: RecorderState::Idle,
            patients: Vec::new(),
            selected_patient_id: None,
            context: SessionContext::default(),
            elapsed_secs: 0,
            timer_armed: false,
            capture: Vec::new(),
            capture_rate_hz: None,
            current_bpm: 0.0,
            submitting: false,
            logger: LogManager::new("recorder"),
        }
    }

    /// Replaces the candidate list and re-resolves the current selection.
    pub fn set_patients(&mut self, patients: Vec<ActivePatient>) {
        self.patients = patients;
        if !self.is_recording() {
            self.context = match &self.selected_patient_id {
                Some(id) => SessionContext::select(&self.patients, id),
                None => SessionContext::default(),
            };
        }
    }

    pub fn patients(&self) -> &[ActivePatient] {
        &self.patients
    }

    pub fn select_patient(&mut self, patient_id: Option<&str>) -> Result<(), Rejection> {
        match self.state {
            RecorderState::Disconnected => return Err(Rejection::Closed),
            RecorderState::Recording => return Err(Rejection::RecordingInProgress),
            _ => {}
        }
        let patient_id = patient_id.map(str::trim).filter(|id| !id.is_empty());
        self.context = match patient_id {
            Some(id) => SessionContext::select(&self.patients, id),
            None => SessionContext::default(),
        };
        self.selected_patient_id = patient_id.map(str::to_string);
        Ok(())
    }

    pub fn connect_device(&mut self) -> Result<Vec<Effect>, Rejection> {
        match self.state {
            RecorderState::Disconnected => Err(Rejection::Closed),
            RecorderState::Connected | RecorderState::Recording => Ok(Vec::new()),
            RecorderState::Idle => {
                self.state = RecorderState::Connected;
                self.logger.record("device connected, opening live feed");
                Ok(vec![Effect::OpenStream {
                    device_id: self.context.device_id().map(str::to_string),
                    delay: Duration::from_millis(self.config.connect_delay_ms),
                }])
            }
        }
    }

    pub fn start_recording(&mut self) -> Result<(), Rejection> {
        match self.state {
            RecorderState::Disconnected => return Err(Rejection::Closed),
            RecorderState::Idle => return Err(Rejection::DeviceNotConnected),
            RecorderState::Recording => return Err(Rejection::AlreadyRecording),
            RecorderState::Connected => {}
        }
        // a pending save still owns the capture
        if self.submitting {
            return Err(Rejection::SaveInProgress);
        }
        if self.selected_patient_id.is_none() || self.context.patient().is_none() {
            return Err(Rejection::NoPatientSelected);
        }
        let Some(session_id) = self.context.session_id() else {
            return Err(Rejection::NoActiveSession);
        };
        if !self.context.has_assigned_device() {
            return Err(Rejection::NoAssignedDevice);
        }

        self.state = RecorderState::Recording;
        self.elapsed_secs = 0;
        self.capture.clear();
        self.capture_rate_hz = None;
        self.timer_armed = true;
        self.context.set_status(&SessionStatus::Recording);
        self.logger
            .record(&format!("recording started for session {session_id}"));
        Ok(())
    }

    /// One elapsed second. Reaching the cap stops the recording and raises the
    /// completion notice; later ticks are ignored.
    pub fn tick(&mut self) -> Vec<Effect> {
        if !self.timer_armed || self.state != RecorderState::Recording {
            return Vec::new();
        }
        self.elapsed_secs += 1;
        if self.elapsed_secs < self.config.duration_cap_secs {
            return Vec::new();
        }

        let mut effects = self.stop_recording();
        effects.push(Effect::Notify(Notice::RecordingComplete {
            seconds: self.config.duration_cap_secs,
        }));
        effects
    }

    /// Block forwarded by the live view; captured only while recording.
    pub fn observe_block(&mut self, block: &BlockSummary) {
        self.current_bpm = block.bpm;
        if self.state != RecorderState::Recording {
            return;
        }
        self.capture.extend_from_slice(&block.samples);
        if block.sampling_rate_hz.is_finite() && block.sampling_rate_hz > 0.0 {
            self.capture_rate_hz = Some(block.sampling_rate_hz.round() as u32);
        }
    }

    pub fn stop_recording(&mut self) -> Vec<Effect> {
        if self.state != RecorderState::Recording {
            return Vec::new();
        }
        self.state = RecorderState::Connected;
        self.timer_armed = false;
        self.logger.record(&format!(
            "recording stopped after {}s, {} samples captured",
            self.elapsed_secs,
            self.capture.len()
        ));

        match self.context.session_id() {
            Some(session_id) => vec![Effect::UpdateSessionStatus {
                session_id,
                status: SessionStatus::Stopped,
            }],
            None => Vec::new(),
        }
    }

    pub fn on_session_status(&mut self, result: Result<(), ApiError>) -> Vec<Effect> {
        match result {
            Ok(()) => {
                self.context.set_status(&SessionStatus::Stopped);
                Vec::new()
            }
            Err(err) => {
                self.logger
                    .error(&format!("session status update failed: {err}"));
                vec![Effect::Notify(Notice::Failure(
                    err.user_message("Error stopping the recording session"),
                ))]
            }
        }
    }

    pub fn disconnect_device(&mut self) -> Vec<Effect> {
        let mut effects = self.stop_recording();
        if self.state == RecorderState::Connected {
            self.state = RecorderState::Idle;
            self.current_bpm = 0.0;
            effects.push(Effect::CloseStream);
            self.logger.record("device disconnected");
        }
        effects
    }

    pub fn create_lectura(&mut self, form: &ReadingForm) -> Result<Vec<Effect>, Rejection> {
        match self.state {
            RecorderState::Disconnected => return Err(Rejection::Closed),
            RecorderState::Idle => return Err(Rejection::DeviceNotConnected),
            RecorderState::Connected | RecorderState::Recording => {}
        }
        if !form.has_patient() {
            return Err(Rejection::NoPatientSelected);
        }
        if self.elapsed_secs == 0 {
            return Err(Rejection::NothingRecorded);
        }
        let Some(session_id) = self.context.session_id() else {
            return Err(Rejection::NoActiveSession);
        };
        let Some(record_count) = form.parsed_record_count() else {
            return Err(Rejection::InvalidRecordCount);
        };
        if self.submitting {
            return Err(Rejection::SaveInProgress);
        }

        self.submitting = true;
        let reading = NewReading {
            ecg_session_id: session_id,
            record_count,
            observations: form.observations.clone(),
            data: self.capture.clone(),
            sample_rate: self
                .capture_rate_hz
                .unwrap_or(self.config.default_sample_rate_hz),
        };
        self.logger.record(&format!(
            "submitting reading for session {session_id} ({} samples)",
            reading.data.len()
        ));
        Ok(vec![Effect::SubmitReading(reading)])
    }

    /// Outcome of a submission. Failures keep the capture so the save can be retried.
    pub fn on_reading_saved(&mut self, result: Result<SaveAck, ApiError>) -> Vec<Effect> {
        self.submitting = false;
        if self.state == RecorderState::Disconnected {
            self.logger.warn("save finished after the screen was closed");
            return Vec::new();
        }

        match result {
            Ok(ack) if ack.ok => {
                self.logger.record("reading saved");
                let mut effects = vec![Effect::Notify(Notice::ReadingSaved)];
                effects.extend(self.cancel());
                effects
            }
            Ok(ack) => {
                let message = ack.message.as_deref().unwrap_or("invalid response");
                self.logger.warn(&format!("reading rejected: {message}"));
                vec![Effect::Notify(Notice::Failure(format!(
                    "Error saving reading: {message}"
                )))]
            }
            Err(err) => {
                self.logger.error(&format!("reading save failed: {err}"));
                vec![Effect::Notify(Notice::Failure(
                    err.user_message("Error saving reading"),
                ))]
            }
        }
    }

    /// Stops, disconnects and leaves the screen without persisting anything.
    pub fn cancel(&mut self) -> Vec<Effect> {
        if self.state == RecorderState::Disconnected {
            return Vec::new();
        }
        let mut effects = self.disconnect_device();
        self.state = RecorderState::Disconnected;
        self.capture = Vec::new();
        self.capture_rate_hz = None;
        effects.push(Effect::NavigateToReadings);
        effects
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    pub fn is_connected(&self) -> bool {
        matches!(
            self.state,
            RecorderState::Connected | RecorderState::Recording
        )
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn timer_armed(&self) -> bool {
        self.timer_armed
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.elapsed_secs
    }

    pub fn duration_cap_secs(&self) -> u32 {
        self.config.duration_cap_secs
    }

    pub fn progress_percent(&self) -> f32 {
        if self.config.duration_cap_secs == 0 {
            return 0.0;
        }
        (self.elapsed_secs as f32 / self.config.duration_cap_secs as f32 * 100.0).min(100.0)
    }

    pub fn captured(&self) -> &[f32] {
        &self.capture
    }

    pub fn current_bpm(&self) -> f32 {
        self.current_bpm
    }

    pub fn selected_patient_id(&self) -> Option<&str> {
        self.selected_patient_id.as_deref()
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }
}

/// `MM:SS` for the elapsed-time readout.
pub fn format_elapsed(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LiveViewConfig;
    use crate::model::{ActiveSessionInfo, AssignedDevice, SampleBlock, StoredReading, Units};
    use crate::render::LiveRenderer;

    fn patient(id: &str, session: bool, device: bool) -> ActivePatient {
        ActivePatient {
            patient_id: id.into(),
            patient_name: "Ana".into(),
            patient_last_name: "Ruiz".into(),
            patient_identification: "CC-1".into(),
            appointment_id: Some(3),
            clinical_register_id: Some(9),
            assigned_device: device.then(|| AssignedDevice {
                id: 1,
                device_id: "5001".into(),
                name: Some("Holter".into()),
            }),
            doctor: None,
            active_session: session.then(|| ActiveSessionInfo {
                id: 44,
                status: Some(SessionStatus::Active),
                lead_config: None,
                sampling_hz: Some(250.0),
                device_id: None,
                started_at: None,
            }),
        }
    }

    fn summary(samples: usize) -> BlockSummary {
        BlockSummary {
            bpm: 72.0,
            samples: vec![0.25; samples],
            sampling_rate_hz: 250.0,
            signal_quality: "good".into(),
            r_peaks: Vec::new(),
        }
    }

    fn form(count: &str) -> ReadingForm {
        ReadingForm {
            patient_id: Some("1".into()),
            record_count: count.into(),
            observations: "resting".into(),
        }
    }

    fn clinic_controller() -> RecordingController {
        let mut controller = RecordingController::new(RecorderConfig::default());
        controller.set_patients(vec![
            patient("1", true, true),
            patient("2", false, true),
            patient("3", true, false),
        ]);
        controller
    }

    fn recording() -> RecordingController {
        let mut controller = clinic_controller();
        controller.select_patient(Some("1")).unwrap();
        controller.connect_device().unwrap();
        controller.start_recording().unwrap();
        controller
    }

    fn notices(effects: &[Effect]) -> Vec<&Notice> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::Notify(notice) => Some(notice),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn connect_opens_feed_for_assigned_device_after_delay() {
        let mut controller = clinic_controller();
        controller.select_patient(Some("1")).unwrap();
        let effects = controller.connect_device().unwrap();
        assert_eq!(
            effects,
            vec![Effect::OpenStream {
                device_id: Some("5001".into()),
                delay: Duration::from_millis(100),
            }]
        );
        assert_eq!(controller.state(), RecorderState::Connected);
        assert!(controller.connect_device().unwrap().is_empty());
    }

    #[test]
    fn connect_without_patient_opens_unfiltered_feed() {
        let mut controller = clinic_controller();
        let effects = controller.connect_device().unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::OpenStream { device_id: None, .. }]
        ));

        // the open feed keeps its filter; only a reconnect picks up the device
        controller.select_patient(Some("1")).unwrap();
        assert!(controller.connect_device().unwrap().is_empty());
        controller.disconnect_device();
        assert!(matches!(
            controller.connect_device().unwrap().as_slice(),
            [Effect::OpenStream { device_id: Some(id), .. }] if id == "5001"
        ));
    }

    #[test]
    fn start_is_rejected_without_preconditions() {
        let mut controller = clinic_controller();
        controller.select_patient(Some("1")).unwrap();
        assert_eq!(
            controller.start_recording(),
            Err(Rejection::DeviceNotConnected)
        );

        let mut controller = clinic_controller();
        controller.connect_device().unwrap();
        assert_eq!(controller.start_recording(), Err(Rejection::NoPatientSelected));

        controller.select_patient(Some("missing")).unwrap();
        assert_eq!(controller.start_recording(), Err(Rejection::NoPatientSelected));

        controller.select_patient(Some("2")).unwrap();
        assert_eq!(controller.start_recording(), Err(Rejection::NoActiveSession));

        controller.select_patient(Some("3")).unwrap();
        assert_eq!(controller.start_recording(), Err(Rejection::NoAssignedDevice));

        assert_eq!(controller.state(), RecorderState::Connected);
        assert!(!controller.timer_armed());
        assert!(controller.tick().is_empty());
        assert_eq!(controller.elapsed_secs(), 0);
    }

    #[test]
    fn rejected_start_keeps_previous_capture() {
        let mut controller = recording();
        controller.observe_block(&summary(10));
        controller.tick();
        controller.stop_recording();
        assert_eq!(controller.start_recording(), Ok(()));
        assert!(controller.captured().is_empty());

        let mut controller = recording();
        controller.observe_block(&summary(10));
        assert_eq!(controller.start_recording(), Err(Rejection::AlreadyRecording));
        assert_eq!(controller.captured().len(), 10);
    }

    #[test]
    fn recording_auto_stops_at_cap_with_one_notice() {
        let mut controller = recording();
        let mut all_notices = Vec::new();
        for tick in 1..=10 {
            assert!(controller.is_recording(), "stopped early at tick {tick}");
            let effects = controller.tick();
            all_notices.extend(notices(&effects).into_iter().cloned());
        }
        assert!(!controller.is_recording());
        assert!(!controller.timer_armed());
        assert_eq!(controller.elapsed_secs(), 10);
        assert_eq!(controller.progress_percent(), 100.0);

        for _ in 0..5 {
            assert!(controller.tick().is_empty());
        }
        assert_eq!(all_notices, vec![Notice::RecordingComplete { seconds: 10 }]);
    }

    #[test]
    fn cap_is_configurable() {
        let mut controller = RecordingController::new(RecorderConfig {
            duration_cap_secs: 60,
            ..RecorderConfig::default()
        });
        controller.set_patients(vec![patient("1", true, true)]);
        controller.select_patient(Some("1")).unwrap();
        controller.connect_device().unwrap();
        controller.start_recording().unwrap();
        for _ in 0..30 {
            controller.tick();
        }
        assert!(controller.is_recording());
        assert_eq!(controller.progress_percent(), 50.0);
    }

    #[test]
    fn stop_reports_session_status_once() {
        let mut controller = recording();
        let effects = controller.stop_recording();
        assert_eq!(
            effects,
            vec![Effect::UpdateSessionStatus {
                session_id: 44,
                status: SessionStatus::Stopped,
            }]
        );
        assert!(controller.stop_recording().is_empty());
        assert_eq!(controller.state(), RecorderState::Connected);
    }

    #[test]
    fn session_status_result_updates_label_or_notifies() {
        let mut controller = recording();
        controller.observe_block(&summary(5));
        controller.stop_recording();
        assert_eq!(controller.context().status_label(), "ACTIVE");

        let effects = controller.on_session_status(Err(ApiError::Transport("offline".into())));
        assert_eq!(notices(&effects).len(), 1);
        assert_eq!(controller.captured().len(), 5);

        assert!(controller.on_session_status(Ok(())).is_empty());
        assert_eq!(controller.context().status_label(), "STOPPED");
    }

    #[test]
    fn only_blocks_seen_while_recording_are_captured() {
        let mut renderer = LiveRenderer::new(LiveViewConfig::default());
        let mut controller = clinic_controller();
        controller.select_patient(Some("1")).unwrap();
        controller.connect_device().unwrap();

        let block = SampleBlock {
            device_id: "5001".into(),
            sampling_rate_hz: 250.0,
            sample_count: 10,
            units: Units::Millivolts,
            samples: (0..10).map(|i| i as f32 / 10.0).collect(),
            timestamp: None,
            bpm: Some(70.0),
            signal_quality: None,
            r_peaks: None,
        };

        for _ in 0..3 {
            let forwarded = renderer.ingest_at(&block, 0.0);
            controller.observe_block(&forwarded);
        }
        controller.start_recording().unwrap();
        for _ in 0..2 {
            let forwarded = renderer.ingest_at(&block, 0.0);
            controller.observe_block(&forwarded);
        }
        controller.stop_recording();

        // one more block after stop is shown but never captured
        let forwarded = renderer.ingest_at(&block, 0.0);
        controller.observe_block(&forwarded);

        assert_eq!(controller.captured().len(), 20);
        assert_eq!(renderer.window().len(), 60);
        assert_eq!(controller.current_bpm(), 70.0);
    }

    #[test]
    fn zero_record_count_is_rejected_without_submission() {
        let mut controller = recording();
        controller.observe_block(&summary(10));
        controller.tick();
        assert_eq!(
            controller.create_lectura(&form("0")),
            Err(Rejection::InvalidRecordCount)
        );
        assert!(!controller.is_submitting());
    }

    #[test]
    fn submission_carries_everything_captured() {
        let mut controller = recording();
        controller.observe_block(&summary(10));
        controller.tick();
        controller.observe_block(&BlockSummary {
            sampling_rate_hz: 500.0,
            ..summary(7)
        });
        controller.tick();
        controller.stop_recording();

        let effects = controller.create_lectura(&form("3")).unwrap();
        let [Effect::SubmitReading(reading)] = effects.as_slice() else {
            panic!("unexpected effects: {effects:?}");
        };
        assert_eq!(reading.ecg_session_id, 44);
        assert_eq!(reading.record_count, 3);
        assert_eq!(reading.observations, "resting");
        assert_eq!(reading.data.len(), 17);
        assert_eq!(reading.sample_rate, 500);
    }

    #[test]
    fn save_requires_a_recorded_second_and_a_connection() {
        let mut controller = clinic_controller();
        controller.select_patient(Some("1")).unwrap();
        assert_eq!(
            controller.create_lectura(&form("1")),
            Err(Rejection::DeviceNotConnected)
        );
        controller.connect_device().unwrap();
        assert_eq!(
            controller.create_lectura(&form("1")),
            Err(Rejection::NothingRecorded)
        );
        controller.start_recording().unwrap();
        assert_eq!(
            controller.create_lectura(&form("1")),
            Err(Rejection::NothingRecorded)
        );

        let mut blank = form("1");
        blank.patient_id = None;
        controller.tick();
        assert_eq!(
            controller.create_lectura(&blank),
            Err(Rejection::NoPatientSelected)
        );
    }

    #[test]
    fn rate_falls_back_to_default_without_captured_blocks() {
        let mut controller = recording();
        controller.tick();
        let effects = controller.create_lectura(&form("1")).unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::SubmitReading(NewReading { sample_rate: 250, data, .. })] if data.is_empty()
        ));
    }

    #[test]
    fn double_submit_is_rejected_until_the_result_arrives() {
        let mut controller = recording();
        controller.tick();
        controller.create_lectura(&form("1")).unwrap();
        assert_eq!(
            controller.create_lectura(&form("1")),
            Err(Rejection::SaveInProgress)
        );
        controller.on_reading_saved(Err(ApiError::Transport("offline".into())));
        assert!(controller.create_lectura(&form("1")).is_ok());
    }

    #[test]
    fn start_during_pending_save_keeps_capture_for_retry() {
        let mut controller = recording();
        controller.observe_block(&summary(50));
        controller.tick();
        controller.stop_recording();
        controller.create_lectura(&form("1")).unwrap();

        assert_eq!(
            controller.start_recording(),
            Err(Rejection::SaveInProgress)
        );
        assert_eq!(controller.state(), RecorderState::Connected);
        assert_eq!(controller.captured().len(), 50);
        assert_eq!(controller.elapsed_secs(), 1);

        controller.on_reading_saved(Err(ApiError::Transport("offline".into())));
        let effects = controller.create_lectura(&form("1")).unwrap();
        assert!(matches!(
            effects.as_slice(),
            [Effect::SubmitReading(NewReading { data, .. })] if data.len() == 50
        ));
    }

    #[test]
    fn failed_save_keeps_capture_and_surfaces_message() {
        let mut controller = recording();
        controller.observe_block(&summary(10));
        controller.tick();
        controller.create_lectura(&form("2")).unwrap();

        let effects = controller.on_reading_saved(Err(ApiError::Status {
            status: 400,
            detail: Some("Session already closed".into()),
        }));
        assert_eq!(
            notices(&effects),
            vec![&Notice::Failure("Session already closed".into())]
        );
        assert_eq!(controller.captured().len(), 10);

        controller.create_lectura(&form("2")).unwrap();
        let effects = controller.on_reading_saved(Ok(SaveAck {
            ok: false,
            message: None,
            reading: None,
        }));
        assert_eq!(
            notices(&effects),
            vec![&Notice::Failure("Error saving reading: invalid response".into())]
        );

        controller.create_lectura(&form("2")).unwrap();
        let effects = controller.on_reading_saved(Err(ApiError::Transport("reset".into())));
        assert_eq!(
            notices(&effects),
            vec![&Notice::Failure("Error saving reading".into())]
        );
        assert!(controller.is_connected());
    }

    #[test]
    fn successful_save_tears_down_and_navigates() {
        let mut controller = recording();
        controller.observe_block(&summary(10));
        controller.tick();
        controller.create_lectura(&form("1")).unwrap();

        let reading: StoredReading =
            serde_json::from_str(r#"{"id": 9, "ecg_session_id": 44}"#).unwrap();
        let effects = controller.on_reading_saved(Ok(SaveAck {
            ok: true,
            message: None,
            reading: Some(reading),
        }));
        assert_eq!(effects.first(), Some(&Effect::Notify(Notice::ReadingSaved)));
        assert!(effects.contains(&Effect::CloseStream));
        assert!(effects.contains(&Effect::UpdateSessionStatus {
            session_id: 44,
            status: SessionStatus::Stopped,
        }));
        assert_eq!(effects.last(), Some(&Effect::NavigateToReadings));
        assert_eq!(controller.state(), RecorderState::Disconnected);
        assert!(controller.captured().is_empty());
    }

    #[test]
    fn disconnect_stops_then_closes_the_feed() {
        let mut controller = recording();
        let effects = controller.disconnect_device();
        assert_eq!(
            effects,
            vec![
                Effect::UpdateSessionStatus {
                    session_id: 44,
                    status: SessionStatus::Stopped,
                },
                Effect::CloseStream,
            ]
        );
        assert_eq!(controller.state(), RecorderState::Idle);
        assert!(!controller.timer_armed());
        assert!(controller.disconnect_device().is_empty());
    }

    #[test]
    fn cancel_is_terminal() {
        let mut controller = recording();
        controller.observe_block(&summary(4));
        let effects = controller.cancel();
        assert_eq!(effects.last(), Some(&Effect::NavigateToReadings));
        assert!(effects.contains(&Effect::CloseStream));
        assert!(!effects
            .iter()
            .any(|effect| matches!(effect, Effect::SubmitReading(_))));
        assert_eq!(controller.state(), RecorderState::Disconnected);
        assert!(controller.cancel().is_empty());
        assert_eq!(controller.connect_device(), Err(Rejection::Closed));
        assert_eq!(controller.select_patient(Some("1")), Err(Rejection::Closed));
    }

    #[test]
    fn patient_cannot_change_mid_recording() {
        let mut controller = recording();
        assert_eq!(
            controller.select_patient(Some("2")),
            Err(Rejection::RecordingInProgress)
        );
        assert_eq!(controller.context().session_id(), Some(44));
    }

    #[test]
    fn elapsed_is_formatted_as_minutes_and_seconds() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(9), "00:09");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3_600), "60:00");
    }
}
