use serde::{Deserialize, Serialize};

/// Signal units carried by the live feed. Only millivolts are produced today.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Units {
    #[default]
    #[serde(rename = "mV")]
    Millivolts,
}

/// One push message of the live sample feed.
///
/// Field names follow the feed's wire format (`fs_hz`, `n`, `rpiks`, ...).
/// A block is immutable once received.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SampleBlock {
    pub device_id: String,
    #[serde(rename = "fs_hz", default)]
    pub sampling_rate_hz: f32,
    #[serde(rename = "n", default)]
    pub sample_count: u32,
    #[serde(default)]
    pub units: Units,
    pub samples: Vec<f32>,
    #[serde(rename = "t", default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f32>,
    #[serde(
        rename = "signalQuality",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub signal_quality: Option<String>,
    #[serde(
        rename = "rpiks",
        alias = "rPeaks",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub r_peaks: Option<Vec<u32>>,
}

impl SampleBlock {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Sampling rate if the block carries a usable one.
    pub fn usable_rate(&self) -> Option<f32> {
        (self.sampling_rate_hz.is_finite() && self.sampling_rate_hz > 0.0)
            .then_some(self.sampling_rate_hz)
    }
}

/// What the live view forwards to its observers for every block it draws.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSummary {
    pub bpm: f32,
    pub samples: Vec<f32>,
    pub sampling_rate_hz: f32,
    pub signal_quality: String,
    pub r_peaks: Vec<u32>,
}
