use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use wanderfield_sim::SimConfig;
use wanderfield_stream::StreamConfig;

/// Everything the driver can be configured with. Both sections are optional
/// in the file and fall back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub stream: StreamConfig,
    pub sim: SimConfig,
}

impl AppConfig {
    /// Load and validate a YAML config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml_str(&text).with_context(|| format!("loading config {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> anyhow::Result<Self> {
        let config: AppConfig = serde_yaml::from_str(text).context("parsing YAML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.stream.validate().context("stream section")?;
        self.sim.validate().context("sim section")?;
        Ok(())
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        serde_yaml::to_string(self).context("serializing config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wanderfield_stream::Coverage;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let yaml = "
stream:
  cell_size: 10.0
  edge_threshold: 1.0
  eviction_radius: 40.0
  coverage: path
sim:
  agent_count: 12
";
        let config = AppConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.stream.cell_size, 10.0);
        assert_eq!(config.stream.coverage, Coverage::Path);
        assert_eq!(config.stream.max_path_cells, 256);
        assert_eq!(config.sim.agent_count, 12);
        assert_eq!(config.sim.agent_speed, 3.5);
    }

    #[test]
    fn invalid_values_name_the_section() {
        let yaml = "
stream:
  eviction_radius: 30.0
";
        let err = AppConfig::from_yaml_str(yaml).unwrap_err();
        assert!(format!("{err:#}").contains("stream section"));
    }

    #[test]
    fn yaml_round_trip() {
        let config = AppConfig::default();
        let text = config.to_yaml().unwrap();
        assert_eq!(AppConfig::from_yaml_str(&text).unwrap(), config);
    }
}
