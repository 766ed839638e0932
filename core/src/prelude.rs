//! Commonly used types, re-exported for hosts.

pub use crate::api::{ApiError, ApiResult, EcgBackend, HttpBackend};
pub use crate::config::{
    LiveViewConfig, PipelineConfig, ReconnectPolicy, RecorderConfig, StoredViewConfig,
};
pub use crate::model::{ActivePatient, BlockSummary, NewReading, SaveAck, SampleBlock, StoredReading};
pub use crate::playback::{group_readings, ReadingDetail, ReadingGroup, ReadingNavigator};
pub use crate::processing::{normalize_samples, WaveformPoint, WaveformWindow};
pub use crate::recording::{
    Effect, Notice, ReadingForm, RecorderState, RecordingController, Rejection,
};
pub use crate::render::{
    CanvasSize, LiveRenderer, Point2, StoredWaveformRenderer, StrokeStyle, Surface, TextStyle,
};
pub use crate::stream::{FeedConnector, HttpFeedConnector, StreamClient, StreamError};
pub use crate::telemetry::{LogManager, MetricsRecorder};
