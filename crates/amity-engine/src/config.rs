//! Configuration for the friendship engine

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Engine configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A value is out of range
    #[error("Invalid configuration value: {0}")]
    Invalid(String),
}

/// Configuration for the friendship engine
///
/// # Examples
///
/// ```
/// use amity_engine::EngineConfig;
///
/// let config = EngineConfig::default();
/// assert_eq!(config.fan_out_limit, 8);
/// assert!(config.validate_identities);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of friend-set reads in flight during one
    /// friends-of-friends traversal
    /// Default: 8
    #[serde(default = "default_fan_out_limit")]
    pub fan_out_limit: usize,

    /// Check that identities exist before graph traversals
    /// Default: true
    #[serde(default = "default_validate_identities")]
    pub validate_identities: bool,
}

fn default_fan_out_limit() -> usize {
    8
}

fn default_validate_identities() -> bool {
    true
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fan_out_limit: default_fan_out_limit(),
            validate_identities: default_validate_identities(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: EngineConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fan_out_limit == 0 {
            return Err(ConfigError::Invalid("fan_out_limit must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.fan_out_limit, 8);
        assert!(config.validate_identities);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml_with_defaults() {
        let config: EngineConfig = toml::from_str("fan_out_limit = 2").unwrap();
        assert_eq!(config.fan_out_limit, 2);
        assert!(config.validate_identities);

        let config: EngineConfig = toml::from_str("").unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_zero_fan_out_rejected() {
        let config = EngineConfig {
            fan_out_limit: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fan_out_limit = 4\nvalidate_identities = false").unwrap();

        let config = EngineConfig::from_file(file.path()).unwrap();
        assert_eq!(config.fan_out_limit, 4);
        assert!(!config.validate_identities);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fan_out_limit = 0").unwrap();
        assert!(matches!(EngineConfig::from_file(file.path()), Err(ConfigError::Invalid(_))));

        assert!(matches!(
            EngineConfig::from_file("/nonexistent/amity.toml"),
            Err(ConfigError::FileRead(_))
        ));
    }

    #[test]
    fn test_serde_roundtrip() {
        let config = EngineConfig {
            fan_out_limit: 3,
            validate_identities: false,
        };
        let serialized = serde_json::to_string(&config).unwrap();
        let deserialized: EngineConfig = serde_json::from_str(&serialized).unwrap();
        assert_eq!(config, deserialized);
    }
}
