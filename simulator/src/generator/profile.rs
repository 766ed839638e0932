use super::template::{baseline, pqrst, R_PHASE};
use chrono::Utc;
use ecgcore::math::StatsHelper;
use ecgcore::model::{SampleBlock, Units};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration of the synthetic ECG feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub device_id: String,
    pub sampling_rate_hz: u32,
    pub block_size: usize,
    pub heart_rate_bpm: f32,
    pub amplitude_mv: f32,
    pub noise_mv: f32,
    pub baseline_mv: f32,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            device_id: "5001".into(),
            sampling_rate_hz: 250,
            block_size: 25,
            heart_rate_bpm: 72.0,
            amplitude_mv: 1.2,
            noise_mv: 0.02,
            baseline_mv: 0.05,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_rate(&self) -> u32 {
        self.sampling_rate_hz.max(1)
    }

    fn normalized_block(&self) -> usize {
        self.block_size.max(1)
    }

    fn normalized_bpm(&self) -> f32 {
        if self.heart_rate_bpm.is_finite() && self.heart_rate_bpm > 0.0 {
            self.heart_rate_bpm
        } else {
            60.0
        }
    }

    /// Real-time spacing between blocks.
    pub fn block_period(&self) -> Duration {
        Duration::from_secs_f64(self.normalized_block() as f64 / f64::from(self.normalized_rate()))
    }
}

/// Deterministic PQRST generator producing feed blocks.
pub struct EcgSynth {
    config: GeneratorConfig,
    rng: StdRng,
    sample_index: u64,
}

impl EcgSynth {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            sample_index: 0,
            config,
        }
    }

    pub fn with_device(mut config: GeneratorConfig, device_id: Option<&str>) -> Self {
        if let Some(device_id) = device_id {
            config.device_id = device_id.to_string();
        }
        Self::new(config)
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn next_block(&mut self) -> SampleBlock {
        let rate = self.config.normalized_rate() as f32;
        let bpm = self.config.normalized_bpm();
        let beat_secs = 60.0 / bpm;
        let count = self.config.normalized_block();

        let mut samples = Vec::with_capacity(count);
        let mut noise = Vec::with_capacity(count);
        let mut r_peaks = Vec::new();
        let mut previous_phase = match self.sample_index.checked_sub(1) {
            Some(index) => self.phase(index, rate, beat_secs),
            None => -1.0,
        };

        for offset in 0..count {
            let index = self.sample_index + offset as u64;
            let seconds = index as f32 / rate;
            let phase = self.phase(index, rate, beat_secs);
            if crossed(previous_phase, phase, R_PHASE) {
                r_peaks.push(offset as u32);
            }
            previous_phase = phase;

            let jitter = if self.config.noise_mv > 0.0 {
                self.rng.gen_range(-self.config.noise_mv..self.config.noise_mv)
            } else {
                0.0
            };
            noise.push(jitter);
            samples.push(
                self.config.amplitude_mv * pqrst(phase)
                    + baseline(seconds, self.config.baseline_mv)
                    + jitter,
            );
        }
        self.sample_index += count as u64;

        let quality = signal_quality(StatsHelper::rms(&samples), StatsHelper::rms(&noise));
        SampleBlock {
            device_id: self.config.device_id.clone(),
            sampling_rate_hz: rate,
            sample_count: count as u32,
            units: Units::Millivolts,
            samples,
            timestamp: Some(Utc::now().timestamp_millis() as f64 / 1000.0),
            bpm: Some(bpm.round()),
            signal_quality: Some(quality.into()),
            r_peaks: Some(r_peaks),
        }
    }

    fn phase(&self, index: u64, rate: f32, beat_secs: f32) -> f32 {
        let seconds = index as f64 / f64::from(rate);
        (seconds / f64::from(beat_secs)).fract() as f32
    }
}

fn crossed(previous: f32, current: f32, target: f32) -> bool {
    if previous <= current {
        previous < target && target <= current
    } else {
        // wrapped into the next beat
        previous < target || target <= current
    }
}

/// Coarse quality label from signal-to-noise ratio.
pub fn signal_quality(signal_rms: f32, noise_rms: f32) -> &'static str {
    if noise_rms <= f32::EPSILON {
        return "good";
    }
    match signal_rms / noise_rms {
        ratio if ratio >= 10.0 => "good",
        ratio if ratio >= 4.0 => "fair",
        _ => "poor",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_follow_configured_shape() {
        let mut synth = EcgSynth::new(GeneratorConfig::default());
        let block = synth.next_block();
        assert_eq!(block.samples.len(), 25);
        assert_eq!(block.sample_count, 25);
        assert_eq!(block.sampling_rate_hz, 250.0);
        assert_eq!(block.device_id, "5001");
        assert_eq!(block.bpm, Some(72.0));
        assert!(block.samples.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn r_peaks_arrive_once_per_beat() {
        let config = GeneratorConfig {
            heart_rate_bpm: 60.0,
            noise_mv: 0.0,
            ..GeneratorConfig::default()
        };
        let mut synth = EcgSynth::new(config);
        // 10 seconds of signal at 60 bpm
        let peaks: usize = (0..100)
            .map(|_| synth.next_block().r_peaks.unwrap_or_default().len())
            .sum();
        assert_eq!(peaks, 10);
    }

    #[test]
    fn same_seed_same_signal() {
        let config = GeneratorConfig {
            seed: 7,
            ..GeneratorConfig::default()
        };
        let a = EcgSynth::new(config.clone()).next_block();
        let b = EcgSynth::new(config).next_block();
        assert_eq!(a.samples, b.samples);
    }

    #[test]
    fn device_override_and_block_period() {
        let synth = EcgSynth::with_device(GeneratorConfig::default(), Some("dev-9"));
        assert_eq!(synth.config().device_id, "dev-9");
        assert_eq!(synth.config().block_period(), Duration::from_millis(100));
    }

    #[test]
    fn quality_tracks_noise() {
        assert_eq!(signal_quality(1.0, 0.0), "good");
        assert_eq!(signal_quality(1.0, 0.05), "good");
        assert_eq!(signal_quality(1.0, 0.2), "fair");
        assert_eq!(signal_quality(1.0, 0.5), "poor");
    }
}
