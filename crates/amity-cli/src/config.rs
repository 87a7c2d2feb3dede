//! Configuration file for the CLI.
//!
//! ```toml
//! database = "amity.db"
//!
//! [engine]
//! fan_out_limit = 8
//! validate_identities = true
//! ```

use amity_engine::EngineConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "amity.toml";

/// CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// SQLite database path
    #[serde(default = "default_database")]
    pub database: PathBuf,

    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

fn default_database() -> PathBuf {
    PathBuf::from("amity.db")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database(),
            engine: EngineConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Load the explicit config file, else `./amity.toml` if present, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }
}
