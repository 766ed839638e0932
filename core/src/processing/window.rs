use std::collections::VecDeque;

/// One plotted sample: synthetic timestamp in milliseconds and amplitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformPoint {
    pub time_ms: f64,
    pub amplitude: f32,
}

impl WaveformPoint {
    pub fn new(time_ms: f64, amplitude: f32) -> Self {
        Self { time_ms, amplitude }
    }
}

/// Append-only rolling buffer bounded by a time span.
///
/// Points must be appended with non-decreasing time; the window never sorts.
/// After each append every retained point satisfies
/// `newest.time_ms - point.time_ms <= duration_ms`.
#[derive(Debug, Clone)]
pub struct WaveformWindow {
    duration_ms: f64,
    points: VecDeque<WaveformPoint>,
}

impl WaveformWindow {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            points: VecDeque::new(),
        }
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn append(&mut self, point: WaveformPoint) {
        debug_assert!(
            self.points
                .back()
                .map_or(true, |last| point.time_ms >= last.time_ms),
            "waveform points must arrive in time order"
        );
        self.points.push_back(point);
        self.trim(point.time_ms);
    }

    fn trim(&mut self, newest_ms: f64) {
        let oldest_allowed = newest_ms - self.duration_ms;
        while self
            .points
            .front()
            .is_some_and(|point| point.time_ms < oldest_allowed)
        {
            self.points.pop_front();
        }
    }

    pub fn points(&self) -> impl ExactSizeIterator<Item = &WaveformPoint> + '_ {
        self.points.iter()
    }

    pub fn newest(&self) -> Option<&WaveformPoint> {
        self.points.back()
    }

    pub fn oldest(&self) -> Option<&WaveformPoint> {
        self.points.front()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }
}
