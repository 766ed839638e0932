use crate::model::{NewReading, SessionStatus};
use std::fmt;
use std::time::Duration;

/// Work the host must carry out after a controller transition.
///
/// The controller never performs I/O itself; hosts map effects onto their
/// executor (tasks, timers, navigation) and report results back.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Open the live feed once `delay` has elapsed.
    OpenStream {
        device_id: Option<String>,
        delay: Duration,
    },
    CloseStream,
    /// Fire-and-forget status change; report the result via `on_session_status`.
    UpdateSessionStatus {
        session_id: u64,
        status: SessionStatus,
    },
    /// Persist a capture; report the result via `on_reading_saved`.
    SubmitReading(NewReading),
    Notify(Notice),
    NavigateToReadings,
}

/// User-visible message raised by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    RecordingComplete { seconds: u32 },
    ReadingSaved,
    Failure(String),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::RecordingComplete { seconds } => write!(
                f,
                "Recording complete - {seconds} seconds of data captured"
            ),
            Notice::ReadingSaved => f.write_str("Reading saved successfully"),
            Notice::Failure(message) => f.write_str(message),
        }
    }
}

/// A precondition violation. Rejections never change controller state.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("Connect the ECG device first")]
    DeviceNotConnected,
    #[error("Select a patient first")]
    NoPatientSelected,
    #[error("The selected patient has no active ECG session")]
    NoActiveSession,
    #[error("The patient has no device assigned in the session")]
    NoAssignedDevice,
    #[error("A recording is already in progress")]
    AlreadyRecording,
    #[error("Stop the current recording first")]
    RecordingInProgress,
    #[error("Record a signal before saving")]
    NothingRecorded,
    #[error("The record count must be a whole number greater than or equal to 1")]
    InvalidRecordCount,
    #[error("The reading is already being saved")]
    SaveInProgress,
    #[error("This recording screen has been closed")]
    Closed,
}
