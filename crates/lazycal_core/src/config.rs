//! Runtime configuration resolved from environment variables.
//!
//! # Responsibility
//! - Resolve database path and logging settings for hosts (FFI, CLI).
//!
//! # Invariants
//! - Blank values behave as unset.
//! - `log_level` is always a normalized level name.

use crate::logging::{default_log_level, parse_log_level, LoggingError};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LAZYCAL_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LAZYCAL_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LAZYCAL_LOG_DIR";

const DEFAULT_DB_FILE_NAME: &str = "lazycal.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel { value: String, source: LoggingError },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel { value, .. } => {
                write!(f, "invalid {ENV_LOG_LEVEL} value `{value}`")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel { source, .. } => Some(source),
        }
    }
}

/// Settings shared by the FFI and CLI hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            log_level: default_log_level(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads `LAZYCAL_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves settings through `lookup` instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(path) = read(ENV_DB_PATH) {
            config.db_path = PathBuf::from(path);
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = parse_log_level(&level).map_err(|source| {
                ConfigError::InvalidLogLevel {
                    value: level.clone(),
                    source,
                }
            })?;
        }
        config.log_dir = read(ENV_LOG_DIR).map(PathBuf::from);
        Ok(config)
    }
}

/// `<temp_dir>/lazycal.sqlite3`.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}
