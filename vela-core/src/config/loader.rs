//! TOML configuration loading.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

use super::types::CoreConfig;

/// Loads `CoreConfig` from TOML files.
#[derive(Debug, Default)]
pub struct ConfigLoader;

impl ConfigLoader {
    pub fn new() -> Self {
        Self
    }

    /// Loads the configuration from the given path.
    ///
    /// A missing file is reported as `ConfigError::NotFound`; callers
    /// that treat the file as optional should fall back to
    /// `CoreConfig::default()` on that variant.
    pub fn load_from_path(&self, path: &Path) -> Result<CoreConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: PathBuf::from(path),
            });
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: PathBuf::from(path),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::ParseError {
            path: PathBuf::from(path),
            source,
        })
    }

    /// Loads the configuration from the given path, substituting defaults
    /// when the file does not exist.
    pub fn load_or_default(&self, path: &Path) -> Result<CoreConfig, ConfigError> {
        match self.load_from_path(path) {
            Err(ConfigError::NotFound { .. }) => Ok(CoreConfig::default()),
            other => other,
        }
    }
}
