//! Core error types

use thiserror::Error;

/// Errors from configuration loading and core setup
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

/// Result alias for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
