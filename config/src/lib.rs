//! Configuration loading for Bulkage.
//!
//! ```toml
//! [batch]
//! debounce_ms = 6
//! max_wait_ms = 15
//! label = "user-lookup"
//! ```
//!
//! Omitting `[batch]` (or both timing keys) selects next-turn batching.
//! The file lives at `~/.bulkage/config.toml` unless `BULKAGE_CONFIG` points
//! elsewhere.

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use bulkage_types::{BatchPolicy, PolicyError};

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "BULKAGE_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error(transparent)]
    Policy(#[from] PolicyError),
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => Some(path.as_path()),
            ConfigError::Policy(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BulkageConfig {
    pub batch: Option<BatchConfig>,
}

/// The `[batch]` section.
#[derive(Debug, Default, Deserialize)]
pub struct BatchConfig {
    /// Quiet period before a flush. Absent means next-turn batching.
    pub debounce_ms: Option<u64>,
    /// Longest a batch may wait under continuous arrivals.
    pub max_wait_ms: Option<u64>,
    /// Resolver label used in diagnostics.
    pub label: Option<String>,
}

impl BulkageConfig {
    /// Load from [`config_path`]. A missing file is `Ok(None)`.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            tracing::debug!("No config at {}", path.display());
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    /// The batching policy described by `[batch]`.
    pub fn batch_policy(&self) -> Result<BatchPolicy, PolicyError> {
        match &self.batch {
            Some(batch) => BatchPolicy::from_millis(batch.debounce_ms, batch.max_wait_ms),
            None => Ok(BatchPolicy::Tick),
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<String> {
        self.batch
            .as_ref()
            .and_then(|batch| batch.label.as_deref())
            .filter(|label| !label.trim().is_empty())
            .map(str::to_string)
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".bulkage").join("config.toml"))
}
