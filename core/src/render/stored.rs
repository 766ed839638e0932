use super::surface::{
    CanvasSize, Point2, StrokeStyle, Surface, TextStyle, GRID_MAJOR, GRID_MINOR, NOTE_GRAY,
    PLAYBACK_RED,
};
use crate::config::StoredViewConfig;
use crate::math::StatsHelper;
use crate::model::StoredReading;
use crate::processing::normalize_samples;

pub const NO_DATA_MESSAGE: &str = "No stored ECG signal data for this reading.";
pub const MINOR_GRID_STEP: f32 = 20.0;
pub const MAJOR_GRID_STEP: f32 = MINOR_GRID_STEP * 5.0;

/// Share of the canvas height left empty above and below the trace.
const VERTICAL_MARGIN: f32 = 0.1;

const MINOR_STROKE: StrokeStyle = StrokeStyle {
    color: GRID_MINOR,
    width: 0.5,
    rounded: false,
};

const MAJOR_STROKE: StrokeStyle = StrokeStyle {
    color: GRID_MAJOR,
    width: 1.0,
    rounded: false,
};

const SIGNAL_STROKE: StrokeStyle = StrokeStyle {
    color: PLAYBACK_RED,
    width: 1.5,
    rounded: true,
};

const NO_DATA_TEXT: TextStyle = TextStyle {
    color: NOTE_GRAY,
    size: 16.0,
};

/// Static, non-incremental renderer for a captured waveform.
#[derive(Debug, Clone)]
pub struct StoredWaveformRenderer {
    samples: Vec<f32>,
    sample_rate_hz: u32,
    max_seconds: u32,
}

impl StoredWaveformRenderer {
    pub fn new(samples: Vec<f32>, sample_rate_hz: u32, config: &StoredViewConfig) -> Self {
        Self {
            samples,
            sample_rate_hz: if sample_rate_hz > 0 {
                sample_rate_hz
            } else {
                config.fallback_sample_rate_hz
            },
            max_seconds: config.max_seconds,
        }
    }

    pub fn from_reading(reading: &StoredReading, config: &StoredViewConfig) -> Self {
        let rate = reading
            .sample_rate
            .filter(|rate| rate.is_finite() && *rate > 0.0)
            .map(|rate| rate.round() as u32)
            .unwrap_or(config.fallback_sample_rate_hz);
        Self::new(normalize_samples(&reading.raw_samples()), rate, config)
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    /// Most recent `sample_rate * max_seconds` samples; older ones are not shown.
    pub fn visible_slice(&self) -> &[f32] {
        let cap = (self.sample_rate_hz as usize).saturating_mul(self.max_seconds as usize);
        let offset = self.samples.len().saturating_sub(cap);
        &self.samples[offset..]
    }

    /// Signal polyline filling 80% of the height, scaled on the visible slice.
    pub fn trace(&self, size: CanvasSize) -> Vec<Point2> {
        let slice = self.visible_slice();
        let Some((min, max)) = StatsHelper::min_max(slice.iter().copied()) else {
            return Vec::new();
        };
        let amplitude = if max - min != 0.0 { max - min } else { 1.0 };
        let to_y = |value: f32| {
            let normalized = (value - min) / amplitude;
            size.height - normalized * (size.height * (1.0 - 2.0 * VERTICAL_MARGIN))
                - size.height * VERTICAL_MARGIN
        };

        if slice.len() == 1 {
            let y = to_y(slice[0]);
            return vec![Point2::new(0.0, y), Point2::new(size.width, y)];
        }

        let last_index = (slice.len() - 1) as f32;
        slice
            .iter()
            .enumerate()
            .map(|(index, &value)| Point2::new(index as f32 / last_index * size.width, to_y(value)))
            .collect()
    }

    pub fn render<S: Surface + ?Sized>(&self, surface: &mut S) {
        let size = surface.size();
        surface.clear();

        if self.samples.is_empty() {
            surface.fill_text_centered(
                NO_DATA_MESSAGE,
                Point2::new(size.width / 2.0, size.height / 2.0),
                NO_DATA_TEXT,
            );
            return;
        }

        draw_grid(surface, size, MINOR_GRID_STEP, MINOR_STROKE);
        draw_grid(surface, size, MAJOR_GRID_STEP, MAJOR_STROKE);
        surface.stroke_polyline(&self.trace(size), SIGNAL_STROKE);
    }
}

fn draw_grid<S: Surface + ?Sized>(surface: &mut S, size: CanvasSize, step: f32, style: StrokeStyle) {
    let mut x = 0.0;
    while x <= size.width {
        surface.stroke_polyline(&[Point2::new(x, 0.0), Point2::new(x, size.height)], style);
        x += step;
    }
    let mut y = 0.0;
    while y <= size.height {
        surface.stroke_polyline(&[Point2::new(0.0, y), Point2::new(size.width, y)], style);
        y += step;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::surface::testing::{DrawOp, RecordingSurface};
    use serde_json::json;

    fn config() -> StoredViewConfig {
        StoredViewConfig::default()
    }

    #[test]
    fn empty_capture_draws_only_the_no_data_message() {
        let renderer = StoredWaveformRenderer::new(Vec::new(), 250, &config());
        let mut surface = RecordingSurface::new(400.0, 240.0);
        renderer.render(&mut surface);
        assert_eq!(surface.texts(), vec![NO_DATA_MESSAGE]);
        assert!(surface.polylines().is_empty());
    }

    #[test]
    fn grid_has_minor_and_major_lines() {
        let renderer = StoredWaveformRenderer::new(vec![0.0, 1.0], 250, &config());
        let mut surface = RecordingSurface::new(200.0, 100.0);
        renderer.render(&mut surface);
        let minor = surface
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Polyline(_, style) if *style == MINOR_STROKE))
            .count();
        let major = surface
            .ops
            .iter()
            .filter(|op| matches!(op, DrawOp::Polyline(_, style) if *style == MAJOR_STROKE))
            .count();
        // 11 verticals + 6 horizontals every 20px, 3 + 2 every 100px
        assert_eq!(minor, 17);
        assert_eq!(major, 5);
        assert_eq!(surface.ops.first(), Some(&DrawOp::Clear));
    }

    #[test]
    fn trace_fills_eighty_percent_of_height() {
        let renderer = StoredWaveformRenderer::new(vec![-1.0, 0.0, 1.0], 250, &config());
        let points = renderer.trace(CanvasSize::new(100.0, 200.0));
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], Point2::new(0.0, 180.0));
        assert_eq!(points[1], Point2::new(50.0, 100.0));
        assert_eq!(points[2], Point2::new(100.0, 20.0));
    }

    #[test]
    fn long_captures_show_only_the_last_minute() {
        let rate = 2;
        let samples: Vec<f32> = (0..200).map(|i| i as f32).collect();
        let renderer = StoredWaveformRenderer::new(samples, rate, &config());
        let visible = renderer.visible_slice();
        assert_eq!(visible.len(), 120);
        assert_eq!(visible[0], 80.0);
    }

    #[test]
    fn flat_and_single_sample_traces_stay_on_canvas() {
        let flat = StoredWaveformRenderer::new(vec![2.0; 4], 250, &config());
        assert!(flat
            .trace(CanvasSize::new(10.0, 100.0))
            .iter()
            .all(|p| p.y == 90.0));

        let single = StoredWaveformRenderer::new(vec![5.0], 250, &config());
        assert_eq!(
            single.trace(CanvasSize::new(10.0, 100.0)),
            vec![Point2::new(0.0, 90.0), Point2::new(10.0, 90.0)]
        );
    }

    #[test]
    fn from_reading_normalizes_payload_and_rate() {
        let reading: StoredReading = serde_json::from_value(json!({
            "id": 1, "ecg_session_id": 2, "data": "{\"samples\": [1, 2, 3]}", "sample_rate": 0
        }))
        .unwrap();
        let renderer = StoredWaveformRenderer::from_reading(&reading, &config());
        assert_eq!(renderer.samples(), &[1.0, 2.0, 3.0]);
        assert_eq!(renderer.sample_rate_hz(), 250);
    }
}
