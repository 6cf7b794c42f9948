//! Error types for the world-state crate.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading a [`WorldConfig`](crate::WorldConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("{field} must be greater than zero")]
    ZeroCapacity { field: &'static str },
}
