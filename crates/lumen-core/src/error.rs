//! Core error types for Lumen.
//!
//! Input validation and configuration failures live here; browser, consent
//! and scan failures have their own error types in their crates.

use thiserror::Error;

/// Central error type for core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Client input errors (missing URLs, malformed URLs)
    #[error("validation error: {0}")]
    Validation(String),
}

impl CoreError {
    /// Whether this error was caused by the caller's input.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Config file not found
    #[error("config file not found at {path}")]
    NotFound {
        /// Path where config was expected
        path: String,
    },

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// I/O error reading config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `CoreError`.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
