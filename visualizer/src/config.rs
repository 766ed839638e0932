use anyhow::Context;
use ecgcore::config::PipelineConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
    /// Entries kept in the activity log.
    pub history_limit: usize,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            pipeline: PipelineConfig::default(),
            history_limit: 20,
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading viewer config {}", path_ref.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing viewer config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn with_api(mut self, api_base_url: Option<String>) -> Self {
        if let Some(url) = api_base_url {
            self.pipeline.api_base_url = url;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_load_reads_yaml_over_defaults() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"api_base_url: http://10.0.0.5:4000/api\n\
recorder:\n  duration_cap_secs: 60\n\
reconnect:\n  max_attempts: 5\n\
history_limit: 5\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ViewerConfig::load(&path).unwrap();
        assert_eq!(cfg.pipeline.api_base_url, "http://10.0.0.5:4000/api");
        assert_eq!(cfg.pipeline.recorder.duration_cap_secs, 60);
        assert_eq!(cfg.pipeline.recorder.default_sample_rate_hz, 250);
        assert_eq!(cfg.pipeline.reconnect.max_attempts, Some(5));
        assert_eq!(cfg.pipeline.reconnect.delay_ms, 2_000);
        assert_eq!(cfg.history_limit, 5);
    }

    #[test]
    fn api_flag_overrides_config() {
        let cfg = ViewerConfig::default().with_api(Some("http://sim:4000/api".into()));
        assert_eq!(cfg.pipeline.api_base_url, "http://sim:4000/api");
        let cfg = ViewerConfig::default().with_api(None);
        assert_eq!(cfg.pipeline.api_base_url, "http://localhost:4000/api");
    }
}
