//! Store sizing configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

pub const DEFAULT_ROSTER_CAPACITY: usize = 8;
pub const DEFAULT_STATUS_SLOTS: usize = 30;

/// Fixed sizes of the world-state store.
///
/// ```toml
/// roster_capacity = 8
/// status_slots = 30
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of party slots.
    pub roster_capacity: usize,

    /// Status slots allocated per entity.
    pub status_slots: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            roster_capacity: DEFAULT_ROSTER_CAPACITY,
            status_slots: DEFAULT_STATUS_SLOTS,
        }
    }
}

impl WorldConfig {
    /// Parse and validate a config from TOML text; missing keys take defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.roster_capacity == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "roster_capacity",
            });
        }
        if self.status_slots == 0 {
            return Err(ConfigError::ZeroCapacity {
                field: "status_slots",
            });
        }
        Ok(())
    }
}
