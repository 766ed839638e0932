use super::surface::{CanvasSize, Point2, StrokeStyle, Surface, TextStyle, MUTED_GRAY, TRACE_RED};
use crate::config::LiveViewConfig;
use crate::math::StatsHelper;
use crate::model::{BlockSummary, SampleBlock};
use crate::processing::{WaveformPoint, WaveformWindow};
use log::debug;
use std::time::{SystemTime, UNIX_EPOCH};

pub const WAITING_MESSAGE: &str = "Waiting for ECG signal...";

const TRACE_STROKE: StrokeStyle = StrokeStyle {
    color: TRACE_RED,
    width: 1.5,
    rounded: true,
};

const PLACEHOLDER_TEXT: TextStyle = TextStyle {
    color: MUTED_GRAY,
    size: 12.0,
};

/// Auto-scaling live trace over the most recent window of the feed.
///
/// Each block is stamped with synthetic, strictly increasing timestamps
/// (`1000 / fs` ms apart) and appended to the rolling window; the whole
/// trace is then rescaled from the windowed points on every redraw.
#[derive(Debug, Clone)]
pub struct LiveRenderer {
    config: LiveViewConfig,
    window: WaveformWindow,
    sampling_rate_hz: f32,
    bpm: f32,
}

impl LiveRenderer {
    pub fn new(config: LiveViewConfig) -> Self {
        Self {
            window: WaveformWindow::new(config.window_ms),
            sampling_rate_hz: config.initial_rate_hz,
            bpm: 0.0,
            config,
        }
    }

    /// Drops the current trace; called on every connect and disconnect.
    pub fn reset(&mut self) {
        self.window.clear();
        self.bpm = 0.0;
    }

    pub fn sampling_rate_hz(&self) -> f32 {
        self.sampling_rate_hz
    }

    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    pub fn window(&self) -> &WaveformWindow {
        &self.window
    }

    pub fn ingest(&mut self, block: &SampleBlock) -> BlockSummary {
        self.ingest_at(block, now_ms())
    }

    /// Appends a block using `now_ms` as the start time when the trace is empty.
    pub fn ingest_at(&mut self, block: &SampleBlock, now_ms: f64) -> BlockSummary {
        if let Some(rate) = block.usable_rate() {
            if rate != self.sampling_rate_hz {
                debug!(
                    "live view sampling rate {} Hz -> {} Hz",
                    self.sampling_rate_hz, rate
                );
                self.sampling_rate_hz = rate;
            }
        }
        self.bpm = block.bpm.unwrap_or(0.0);

        let step_ms = 1000.0 / f64::from(self.sampling_rate_hz);
        let mut time_ms = match self.window.newest() {
            Some(last) => last.time_ms + step_ms,
            None => now_ms,
        };
        for &sample in &block.samples {
            self.window.append(WaveformPoint::new(time_ms, sample));
            time_ms += step_ms;
        }

        BlockSummary {
            bpm: self.bpm,
            samples: block.samples.clone(),
            sampling_rate_hz: self.sampling_rate_hz,
            signal_quality: block
                .signal_quality
                .clone()
                .unwrap_or_else(|| "unknown".into()),
            r_peaks: block.r_peaks.clone().unwrap_or_default(),
        }
    }

    /// Vertical range including padding, recomputed from the windowed points.
    pub fn vertical_range(&self) -> Option<(f32, f32)> {
        let (min, max) = StatsHelper::min_max(self.window.points().map(|p| p.amplitude))?;
        let padding = self.config.min_padding.max((max - min) * 0.1);
        Some((min - padding, max + padding))
    }

    /// Screen-space polyline for the current window, or `None` below two points.
    pub fn trace(&self, size: CanvasSize) -> Option<Vec<Point2>> {
        if self.window.len() < 2 {
            return None;
        }
        let newest = self.window.newest()?.time_ms;
        let span_ms = self.window.duration_ms();
        let start_ms = newest - span_ms;
        let (low, high) = self.vertical_range()?;
        let value_span = (high - low).max(f32::EPSILON);

        let points = self
            .window
            .points()
            .map(|point| {
                let x = ((point.time_ms - start_ms) / span_ms) as f32 * size.width;
                let ratio = (point.amplitude - low) / value_span;
                Point2::new(x, size.height - ratio * size.height)
            })
            .collect();
        Some(points)
    }

    /// Full redraw: clear, then either the trace or a centered placeholder.
    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let size = surface.size();
        surface.clear();
        match self.trace(size) {
            Some(points) => surface.stroke_polyline(&points, TRACE_STROKE),
            None => surface.fill_text_centered(
                WAITING_MESSAGE,
                Point2::new(size.width / 2.0, size.height / 2.0),
                PLACEHOLDER_TEXT,
            ),
        }
    }
}

fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64()
        * 1000.0
}
