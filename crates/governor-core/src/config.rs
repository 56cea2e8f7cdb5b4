//! Shared configuration loaded by both the observer and controller binaries.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ContainerSpec;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    pub sink: String,
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

fn default_sample_interval_ms() -> u64 {
    2000
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsConfig {
    pub samples_sink: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MlConfig {
    pub model_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub events: EventsConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub ml: MlConfig,
    pub containers: BTreeMap<String, ContainerSpec>,
}

impl Config {
    /// Loads and validates configuration from a YAML file.
    ///
    /// Every container's `soft <= hard` invariant is checked across CPU,
    /// memory, and both I/O directions; the first violation found is
    /// returned as a fatal [`ConfigError::Invariant`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: Config = serde_yaml::from_str(content)?;
        for (name, spec) in config.containers.iter_mut() {
            spec.name = name.clone();
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for spec in self.containers.values() {
            spec.check_invariants().map_err(ConfigError::Invariant)?;
        }
        Ok(())
    }

    pub fn sample_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.events.sample_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
events:
  sink: /tmp/events.jsonl
  sample_interval_ms: 2000
ml:
  model_path: /tmp/model.bin
containers:
  web:
    cgroup_path: /sys/fs/cgroup/web
    cpu: { soft_quota_us: 10000, hard_quota_us: 50000, period_us: 100000, adjust_step_us: 5000 }
    memory: { soft_bytes: 104857600, hard_bytes: 209715200, adjust_step_bytes: 20971520 }
    io: { device: "8:0", soft_rbps: 1000, soft_wbps: 1000, hard_rbps: 5000, hard_wbps: 5000, adjust_step_bps: 500 }
"#;

    #[test]
    fn parses_and_fills_container_names() {
        let config = Config::parse(YAML).unwrap();
        assert_eq!(config.containers["web"].name, "web");
        assert_eq!(config.events.sample_interval_ms, 2000);
        assert_eq!(config.ml.model_path.as_deref(), Some("/tmp/model.bin"));
    }

    #[test]
    fn defaults_sample_interval_when_absent() {
        let yaml = r#"
events:
  sink: /tmp/events.jsonl
containers: {}
"#;
        let config = Config::parse(yaml).unwrap();
        assert_eq!(config.events.sample_interval_ms, 2000);
    }

    #[test]
    fn rejects_soft_above_hard() {
        let bad = YAML.replace("soft_quota_us: 10000", "soft_quota_us: 90000");
        let err = Config::parse(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::Invariant(_)));
    }
}
