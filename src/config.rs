use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Longest allowed gap between scheduled status sweeps (one year).
pub const MAX_SWEEP_INTERVAL_HOURS: u64 = 24 * 366;

/// Runtime settings, read from an optional YAML file.
///
/// Every key is optional; missing keys take the defaults below. Command-line
/// flags are applied on top by the binary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HerdConfig {
    pub database: String,
    pub port: u16,
    pub cors_origin: Option<String>,
    pub sweep_interval_hours: u64,
    pub session_ttl_hours: i64,
    pub reset_token_ttl_minutes: i64,
    pub page_size: u64,
    pub public_base_url: String,
}

impl Default for HerdConfig {
    fn default() -> Self {
        Self {
            database: "herdbook.db".to_string(),
            port: 3000,
            cors_origin: None,
            sweep_interval_hours: 24,
            session_ttl_hours: 24,
            reset_token_ttl_minutes: 60,
            page_size: 10,
            public_base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl HerdConfig {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: HerdConfig =
            serde_yaml::from_str(content).context("Failed to parse herdbook config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if !(1..=MAX_SWEEP_INTERVAL_HOURS).contains(&self.sweep_interval_hours) {
            anyhow::bail!(
                "sweep_interval_hours must be between 1 and {}",
                MAX_SWEEP_INTERVAL_HOURS
            );
        }
        if self.page_size == 0 {
            anyhow::bail!("page_size must be at least 1");
        }
        if self.session_ttl_hours <= 0 || self.reset_token_ttl_minutes <= 0 {
            anyhow::bail!("session and reset token lifetimes must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_yaml_gives_defaults() {
        let config = HerdConfig::from_yaml("{}").unwrap();
        assert_eq!(config, HerdConfig::default());
        assert_eq!(config.port, 3000);
        assert_eq!(config.database, "herdbook.db");
    }

    #[test]
    fn partial_yaml_overrides_keys() {
        let yaml = r#"
database: /var/lib/herdbook/farm.db
port: 8080
cors_origin: https://farm.example
page_size: 25
"#;
        let config = HerdConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.database, "/var/lib/herdbook/farm.db");
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origin.as_deref(), Some("https://farm.example"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.sweep_interval_hours, 24);
    }

    #[test]
    fn zero_interval_is_rejected() {
        assert!(HerdConfig::from_yaml("sweep_interval_hours: 0").is_err());
    }

    #[test]
    fn oversized_interval_is_rejected() {
        let yaml = format!("sweep_interval_hours: {}", u64::MAX);
        assert!(HerdConfig::from_yaml(&yaml).is_err());
        let yaml = format!("sweep_interval_hours: {}", MAX_SWEEP_INTERVAL_HOURS);
        assert!(HerdConfig::from_yaml(&yaml).is_ok());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "session_ttl_hours: 8").unwrap();
        let config = HerdConfig::load(file.path()).unwrap();
        assert_eq!(config.session_ttl_hours, 8);
        assert!(HerdConfig::load_or_default(None).is_ok());
    }
}
