use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How the stream client recovers from a dropped feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectPolicy {
    pub delay_ms: u64,
    /// Consecutive failed channels tolerated before giving up; `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            delay_ms: 2_000,
            max_attempts: None,
        }
    }
}

impl ReconnectPolicy {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveViewConfig {
    pub window_ms: f64,
    pub min_padding: f32,
    pub height: f32,
    /// Horizontal space reserved around the canvas inside its container.
    pub side_padding: f32,
    pub initial_rate_hz: f32,
}

impl Default for LiveViewConfig {
    fn default() -> Self {
        Self {
            window_ms: 6_000.0,
            min_padding: 20.0,
            height: 120.0,
            side_padding: 32.0,
            initial_rate_hz: 250.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub duration_cap_secs: u32,
    pub default_sample_rate_hz: u32,
    /// Pause between enabling the device and opening the feed.
    pub connect_delay_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            duration_cap_secs: 10,
            default_sample_rate_hz: 250,
            connect_delay_ms: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredViewConfig {
    pub max_seconds: u32,
    pub fallback_sample_rate_hz: u32,
    pub height: f32,
}

impl Default for StoredViewConfig {
    fn default() -> Self {
        Self {
            max_seconds: 60,
            fallback_sample_rate_hz: 250,
            height: 240.0,
        }
    }
}

/// Everything a host needs to wire the pipeline against a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub api_base_url: String,
    pub reconnect: ReconnectPolicy,
    pub live: LiveViewConfig,
    pub recorder: RecorderConfig,
    pub stored: StoredViewConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4000/api".into(),
            reconnect: ReconnectPolicy::default(),
            live: LiveViewConfig::default(),
            recorder: RecorderConfig::default(),
            stored: StoredViewConfig::default(),
        }
    }
}
