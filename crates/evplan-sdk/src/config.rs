use std::fs;
use std::path::{Path, PathBuf};

use evplan_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

use crate::error::{SdkError, SdkResult};

/// Exclusive upper bound on `recent_limit`, set by the recent index's `u32` handles.
pub const MAX_RECENT_LIMIT: usize = u32::MAX as usize;

/// Configuration for a [`Planner`](crate::Planner).
///
/// Every field has a default, so an empty TOML document is a valid config:
///
/// ```toml
/// data_path = "/var/lib/evplan/attendees.db"
/// recent_limit = 32
///
/// [registry]
/// initial_capacity = 101
/// max_load_factor = 0.6
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Registry file loaded on open and written on save.
    pub data_path: PathBuf,
    /// Registry tuning.
    pub registry: RegistryConfig,
    /// How many recently registered keys the recent index remembers.
    pub recent_limit: usize,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("evplan.db"),
            registry: RegistryConfig::default(),
            recent_limit: 16,
        }
    }
}

impl PlannerConfig {
    /// Default settings with the registry file at `data_path`.
    pub fn at(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Default::default()
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> SdkResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> SdkResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| SdkError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check every value is in range.
    pub fn validate(&self) -> SdkResult<()> {
        if self.data_path.as_os_str().is_empty() {
            return Err(SdkError::Config("data_path must not be empty".into()));
        }
        if self.recent_limit == 0 {
            return Err(SdkError::Config("recent_limit must be at least 1".into()));
        }
        // One arena slot beyond the limit is live while the oldest key is evicted.
        if self.recent_limit >= MAX_RECENT_LIMIT {
            return Err(SdkError::Config(format!(
                "recent_limit must be below {MAX_RECENT_LIMIT}, got {}",
                self.recent_limit
            )));
        }
        self.registry.validate()?;
        Ok(())
    }
}
