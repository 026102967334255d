//! Configuration loading and management
//!
//! Handles parsing of `.thesis.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::progress::{ProgressAggregator, ProgressWeights};

/// Name of the configuration file at the project root
pub const CONFIG_FILE: &str = ".thesis.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Progress weighting
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Due-soon and inactivity thresholds
    #[serde(default)]
    pub digest: DigestConfig,

    /// Store locking
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Progress configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Weight of the status signal (todo/doing/done)
    #[serde(default = "default_status_weight")]
    pub status_weight: u32,

    /// Weight of the word-count signal
    #[serde(default)]
    pub effort_weight: u32,

    /// Report status percent only
    #[serde(default)]
    pub simple_mode: bool,
}

fn default_status_weight() -> u32 {
    100
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            status_weight: default_status_weight(),
            effort_weight: 0,
            simple_mode: false,
        }
    }
}

impl ProgressConfig {
    pub fn weights(&self) -> ProgressWeights {
        ProgressWeights::new(self.status_weight, self.effort_weight)
    }

    pub fn aggregator(&self) -> ProgressAggregator {
        ProgressAggregator::new(self.weights()).with_simple_mode(self.simple_mode)
    }
}

/// Digest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DigestConfig {
    /// Days ahead to report due tasks
    #[serde(default = "default_due_days")]
    pub due_days: u32,

    /// Days without word logs before nudging
    #[serde(default = "default_inactivity_days")]
    pub inactivity_days: u32,
}

fn default_due_days() -> u32 {
    3
}

fn default_inactivity_days() -> u32 {
    5
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            due_days: default_due_days(),
            inactivity_days: default_inactivity_days(),
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// How long to wait for the store lock
    #[serde(default = "default_lock_timeout_ms")]
    pub lock_timeout_ms: u64,
}

fn default_lock_timeout_ms() -> u64 {
    crate::lock::DEFAULT_LOCK_TIMEOUT_MS
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            lock_timeout_ms: default_lock_timeout_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a `.thesis.toml` file
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project root, or return defaults
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if !config_path.exists() {
            return Self::default();
        }
        match Self::load(&config_path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!(path = %config_path.display(), error = %err, "ignoring invalid config");
                Self::default()
            }
        }
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> crate::error::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn validate(&self) -> crate::error::Result<()> {
        if self.digest.inactivity_days == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "digest.inactivity_days must be >= 1".to_string(),
            ));
        }
        if self.storage.lock_timeout_ms == 0 {
            return Err(crate::error::Error::InvalidConfig(
                "storage.lock_timeout_ms must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
