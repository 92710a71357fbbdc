//! Error types for e2sim

use thiserror::Error;

/// Error types shared by the e2sim crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A value handed to a constructor is out of its domain.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Protocol-related errors.
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Network I/O errors.
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// YAML parsing errors.
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result alias using the common [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
