//! JSON file configuration adapter.
//!
//! Implements [`ConfigPort`] over an optional file path, normally taken
//! from the `SEATHEAT_CONFIG` environment variable. Partial documents are
//! fine: missing keys keep their defaults.
//!
//! | Source state              | Result                          |
//! |---------------------------|---------------------------------|
//! | no path configured        | `Ok(SystemConfig::default())`   |
//! | path set, file missing    | `Err(NotFound)`                 |
//! | unreadable                | `Err(IoError)`                  |
//! | not valid JSON            | `Err(Corrupted)`                |
//! | fails validation          | `Err(ValidationFailed(..))`     |

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::app::ports::{ConfigError, ConfigPort};
use crate::config::SystemConfig;
use crate::error::Error;

/// Environment variable holding the config file path.
pub const CONFIG_ENV: &str = "SEATHEAT_CONFIG";

pub struct FileConfig {
    path: Option<PathBuf>,
}

impl FileConfig {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    /// Path from [`CONFIG_ENV`], if set and non-empty.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from);
        Self::new(path)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

/// Parse and validate a JSON document.
pub fn parse_config(text: &str) -> Result<SystemConfig, ConfigError> {
    let cfg: SystemConfig = serde_json::from_str(text).map_err(|e| {
        warn!("FileConfig: parse error: {}", e);
        ConfigError::Corrupted
    })?;
    cfg.validate().map_err(|e| match e {
        Error::Config(msg) => ConfigError::ValidationFailed(msg),
        _ => ConfigError::Corrupted,
    })?;
    Ok(cfg)
}

impl ConfigPort for FileConfig {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let Some(path) = self.path() else {
            info!("FileConfig: no config file set, using defaults");
            return Ok(SystemConfig::default());
        };
        let text = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => ConfigError::NotFound,
            _ => ConfigError::IoError,
        })?;
        let cfg = parse_config(&text)?;
        info!("FileConfig: loaded {}", path.display());
        Ok(cfg)
    }
}
