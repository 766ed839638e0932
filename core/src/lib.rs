//! Core of the ECG acquisition and playback pipeline.
//!
//! Live samples flow from the [`stream`] client into the [`render::LiveRenderer`]
//! and, while a recording runs, into the [`recording::RecordingController`].
//! Saved readings are fetched through [`api`] and drawn by the
//! [`render::StoredWaveformRenderer`]. Nothing here owns a UI toolkit; hosts
//! supply a drawing [`render::Surface`] and execute controller effects.

pub mod api;
pub mod config;
pub mod math;
pub mod model;
pub mod playback;
pub mod prelude;
pub mod processing;
pub mod recording;
pub mod render;
pub mod stream;
pub mod telemetry;

pub use config::PipelineConfig;
pub use prelude::{ApiError, Effect, Rejection, SampleBlock, StoredReading, StreamError};
