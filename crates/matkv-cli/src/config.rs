//! Optional TOML configuration file

use std::path::Path;

use anyhow::{Context, Result};
use matkv_store::{ClientConfig, StoreConfig};
use matkv_telemetry::LogConfig;
use serde::{Deserialize, Serialize};

/// Everything the CLI can read from `--config`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub client: ClientConfig,
    pub store: StoreConfig,
    pub log: LogConfig,
}

impl CliConfig {
    /// Load from a TOML file; missing sections keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matkv_telemetry::{LogFormat, LogLevel, LogOutput};

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(CliConfig::parse("").unwrap(), CliConfig::default());
    }

    #[test]
    fn test_parse_sections() {
        let config = CliConfig::parse(
            r#"
[client]
addr = "10.0.0.5:6380"
connect_timeout_ms = 250

[store]
key_prefix = "frames"
read_timeout_ms = 2000

[log]
level = "debug"
format = "json"
output = { file = "/tmp/matkv.log" }
"#,
        )
        .unwrap();

        assert_eq!(config.client.addr, "10.0.0.5:6380");
        assert_eq!(config.client.connect_timeout_ms, 250);
        assert!(config.client.nodelay);
        assert_eq!(config.store.object_key("a"), "frames:a");
        assert_eq!(config.store.read_timeout_ms, Some(2000));
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.log.output, LogOutput::File("/tmp/matkv.log".into()));
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("matkv.toml");
        std::fs::write(&path, "[client]\naddr = 5\n").unwrap();

        let err = CliConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("matkv.toml"));
        assert!(CliConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
