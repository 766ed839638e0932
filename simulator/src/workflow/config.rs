use crate::generator::profile::GeneratorConfig;
use anyhow::Context;
use ecgcore::model::{
    ActivePatient, ActiveSessionInfo, AssignedDevice, AssignedDoctor, SessionStatus,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

/// Everything the simulator serves: where to listen, the synthetic feed and
/// the patients returned by the active-session lookup.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorConfig {
    pub bind: SocketAddr,
    pub generator: GeneratorConfig,
    pub patients: Vec<ActivePatient>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 4000)),
            generator: GeneratorConfig::default(),
            patients: fixture_patients(),
        }
    }
}

impl SimulatorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulator config {}", path_ref.display()))?;
        let config: SimulatorConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulator config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(port: u16, sampling_rate_hz: u32, heart_rate_bpm: f32, seed: u64) -> Self {
        let mut config = Self::default();
        config.bind.set_port(port);
        config.generator.sampling_rate_hz = sampling_rate_hz.max(1);
        config.generator.heart_rate_bpm = heart_rate_bpm;
        config.generator.seed = seed;
        config
    }
}

/// Three patients covering the recording preconditions: ready, no device,
/// and no active session.
pub fn fixture_patients() -> Vec<ActivePatient> {
    let doctor = AssignedDoctor {
        id: "1".into(),
        name: Some("Laura".into()),
        last_name: Some("Gómez".into()),
        identification: Some("MD-100".into()),
        email: Some("laura.gomez@example.com".into()),
    };
    let session = |id: u64, device_id: Option<&str>| ActiveSessionInfo {
        id,
        status: Some(SessionStatus::Active),
        lead_config: Some("II".into()),
        sampling_hz: Some(250.0),
        device_id: device_id.map(str::to_string),
        started_at: None,
    };

    vec![
        ActivePatient {
            patient_id: "1".into(),
            patient_name: "Ana".into(),
            patient_last_name: "Ruiz".into(),
            patient_identification: "CC-1001".into(),
            appointment_id: Some(10),
            clinical_register_id: Some(100),
            assigned_device: Some(AssignedDevice {
                id: 1,
                device_id: "5001".into(),
                name: Some("Holter H1".into()),
            }),
            doctor: Some(doctor.clone()),
            active_session: Some(session(1, Some("5001"))),
        },
        ActivePatient {
            patient_id: "2".into(),
            patient_name: "Carlos".into(),
            patient_last_name: "Pérez".into(),
            patient_identification: "CC-1002".into(),
            appointment_id: Some(11),
            clinical_register_id: Some(101),
            assigned_device: None,
            doctor: Some(doctor.clone()),
            active_session: Some(session(2, None)),
        },
        ActivePatient {
            patient_id: "3".into(),
            patient_name: "Elena".into(),
            patient_last_name: "Torres".into(),
            patient_identification: "CC-1003".into(),
            appointment_id: None,
            clinical_register_id: None,
            assigned_device: Some(AssignedDevice {
                id: 2,
                device_id: "5002".into(),
                name: Some("Holter H2".into()),
            }),
            doctor: Some(doctor),
            active_session: None,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_overrides_port_and_generator() {
        let cfg = SimulatorConfig::from_args(4100, 500, 90.0, 3);
        assert_eq!(cfg.bind.port(), 4100);
        assert_eq!(cfg.generator.sampling_rate_hz, 500);
        assert_eq!(cfg.generator.heart_rate_bpm, 90.0);
        assert_eq!(cfg.generator.seed, 3);
        assert_eq!(cfg.patients.len(), 3);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"bind: 0.0.0.0:4200\n\
generator:\n  sampling_rate_hz: 500\n  block_size: 50\n\
patients:\n  - patient_id: 42\n    patient_name: Test\n    active_session: {id: 9, status: active}\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = SimulatorConfig::load(&path).unwrap();
        assert_eq!(cfg.bind.port(), 4200);
        assert_eq!(cfg.generator.sampling_rate_hz, 500);
        assert_eq!(cfg.generator.heart_rate_bpm, 72.0);
        assert_eq!(cfg.patients[0].patient_id, "42");
        assert_eq!(cfg.patients[0].active_session_id(), Some(9));
    }

    #[test]
    fn config_load_reports_missing_file() {
        let err = SimulatorConfig::load("/nonexistent/sim.yaml").unwrap_err();
        assert!(err.to_string().contains("reading simulator config"));
    }
}
