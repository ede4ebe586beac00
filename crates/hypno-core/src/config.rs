use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::settings::{MerkabaSettings, PatternSettings, Settings};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode config: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Start-up configuration for both scenes, stored as JSON.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SceneConfig {
    pub pattern: PatternSettings,
    pub merkaba: MerkabaSettings,
}

impl SceneConfig {
    /// Pull every value into its declared range.
    pub fn clamp(&mut self) {
        self.pattern.clamp();
        self.merkaba.clamp();
    }
}

/// Parse a JSON config. Missing fields take their defaults; values are clamped.
pub fn parse_config(json: &str) -> Result<SceneConfig, serde_json::Error> {
    let mut config: SceneConfig = serde_json::from_str(json)?;
    config.clamp();
    Ok(config)
}

/// Load a config file from disk.
pub fn load_config(path: &Path) -> Result<SceneConfig, ConfigError> {
    let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse_config(&json).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("loaded scene config from {}", path.display());
    Ok(config)
}

/// Save a config file to disk as pretty JSON.
pub fn save_config(path: &Path, config: &SceneConfig) -> Result<(), ConfigError> {
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}
