//! Error types for the Vela core layer.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type of the core layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Configuration error.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging subsystem error.
    #[error(transparent)]
    Logging(#[from] LoggingError),

    /// Underlying I/O failure outside of configuration handling.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found at the given path.
    #[error("configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed as TOML.
    #[error("failed to parse configuration file {path}: {source}")]
    ParseError {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A configuration value is out of its valid domain.
    #[error("invalid configuration value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Logging initialization errors.
#[derive(Debug, Error)]
pub enum LoggingError {
    /// The global subscriber could not be installed.
    #[error("failed to initialize logging: {0}")]
    InitializationFailure(String),

    /// The configured log file location is unusable.
    #[error("log file path {path} is unusable: {reason}")]
    FilePathInvalid { path: PathBuf, reason: String },
}
