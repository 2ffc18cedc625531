//! Configuration type definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::defaults;

/// Output format of the log stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Log level filter, e.g. "info" or "vela_session=debug".
    pub level: String,
    /// Console/file output format.
    pub format: LogFormat,
    /// Optional log file; when set, a daily-rolling file layer is added.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::default_log_level(),
            format: LogFormat::default(),
            file_path: None,
        }
    }
}

/// Root configuration of the core layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CoreConfig {
    pub logging: LoggingConfig,
}
