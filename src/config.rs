//! Configuration for the healthlog engine.
//!
//! The storage location is an explicit value injected into the store rather
//! than a module-level global path.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::InsightError;

/// Main configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Base directory holding day records, events, and the patterns snapshot
    pub data_dir: PathBuf,

    /// Default number of similar days returned by lookups
    pub similar_top_n: usize,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("healthlog");

        Self {
            data_dir,
            similar_top_n: crate::similar::DEFAULT_TOP_N,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists.
    pub fn load() -> Result<Self, InsightError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), InsightError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&config_path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("healthlog")
            .join("config.json")
    }
}
