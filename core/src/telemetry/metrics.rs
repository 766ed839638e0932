use std::sync::Mutex;

/// Counters maintained by the live stream client.
pub struct MetricsRecorder {
    inner: Mutex<StreamMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamMetrics {
    pub blocks: usize,
    pub malformed: usize,
    pub reconnects: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StreamMetrics::default()),
        }
    }

    pub fn record_block(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.blocks += 1;
        }
    }

    pub fn record_malformed(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.malformed += 1;
        }
    }

    pub fn record_reconnect(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.reconnects += 1;
        }
    }

    pub fn snapshot(&self) -> StreamMetrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            StreamMetrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_independently() {
        let recorder = MetricsRecorder::new();
        recorder.record_block();
        recorder.record_block();
        recorder.record_malformed();
        recorder.record_reconnect();
        assert_eq!(
            recorder.snapshot(),
            StreamMetrics {
                blocks: 2,
                malformed: 1,
                reconnects: 1
            }
        );
    }
}
