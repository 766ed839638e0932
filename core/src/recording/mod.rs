//! Recording flow: precondition gating, capture, and persistence hand-off.

pub mod context;
pub mod controller;
pub mod effects;
pub mod form;

pub use context::SessionContext;
pub use controller::{format_elapsed, RecorderState, RecordingController};
pub use effects::{Effect, Notice, Rejection};
pub use form::ReadingForm;
