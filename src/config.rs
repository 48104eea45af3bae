use crate::{gift::GiftConfig, render::DisplayConfig, simulation::SimulationConfig};
use log::LevelFilter;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const CONFIG_ENV: &str = "FIREWORKS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "fireworks.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
    pub gift: GiftConfig,
    pub log_level: String,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        FireworksConfig {
            simulation: SimulationConfig::default(),
            display: DisplayConfig::default(),
            gift: GiftConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl FireworksConfig {
    pub fn from_toml_str(text: &str) -> Result<FireworksConfig, ConfigError> {
        let config: FireworksConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<FireworksConfig, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source: source,
        })?;
        FireworksConfig::from_toml_str(&text)
    }

    /// `$FIREWORKS_CONFIG` if set, else `fireworks.toml` if present, else defaults.
    pub fn load_default() -> Result<FireworksConfig, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return FireworksConfig::load(Path::new(&path));
        }
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if path.exists() {
            return FireworksConfig::load(path);
        }
        Ok(FireworksConfig::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        if self.display.width == 0 || self.display.height == 0 {
            return Err(ConfigError::Invalid(
                "display size must be non-zero".to_string(),
            ));
        }
        self.log_level_filter()?;
        Ok(())
    }

    pub fn log_level_filter(&self) -> Result<LevelFilter, ConfigError> {
        self.log_level
            .parse()
            .map_err(|_| ConfigError::Invalid(format!("unknown log level {:?}", self.log_level)))
    }
}
