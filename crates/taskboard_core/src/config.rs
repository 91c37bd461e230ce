//! Store configuration.
//!
//! # Responsibility
//! - Describe where the database lives and how the process logs.
//! - Load settings from a TOML file, then apply `TASKBOARD_*` overrides.
//!
//! # Invariants
//! - Loading never touches the database; it only produces values.
//! - Environment overrides always win over file values.
//!
//! File shape:
//!
//! ```toml
//! [database]
//! path = "taskboard.db"   # or ":memory:"
//! busy_timeout_ms = 5000
//!
//! [logging]
//! level = "info"
//! dir = "/var/log/taskboard"
//! ```

use crate::db::DEFAULT_BUSY_TIMEOUT;
use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_DB_PATH: &str = "TASKBOARD_DB_PATH";
pub const ENV_BUSY_TIMEOUT_MS: &str = "TASKBOARD_BUSY_TIMEOUT_MS";
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TASKBOARD_LOG_DIR";

const MEMORY_PATH: &str = ":memory:";
const DEFAULT_DB_FILE: &str = "taskboard.db";

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    InvalidValue {
        key: &'static str,
        value: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidValue { key, value } => write!(f, "invalid value `{value}` for `{key}`"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Where the store keeps its rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseLocation {
    File(PathBuf),
    Memory,
}

impl DatabaseLocation {
    fn parse(value: &str) -> Self {
        if value.trim() == MEMORY_PATH {
            Self::Memory
        } else {
            Self::File(PathBuf::from(value.trim()))
        }
    }
}

/// Resolved settings used to open a [`crate::Store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub database: DatabaseLocation,
    pub busy_timeout: Duration,
    pub log_level: String,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseLocation::File(PathBuf::from(DEFAULT_DB_FILE)),
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    database: RawDatabase,
    #[serde(default)]
    logging: RawLogging,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDatabase {
    path: Option<String>,
    busy_timeout_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawLogging {
    level: Option<String>,
    dir: Option<PathBuf>,
}

impl StoreConfig {
    /// Parses TOML text; missing keys keep their defaults.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let raw: RawConfig = toml::from_str(text)?;
        let mut config = Self::default();
        if let Some(path) = raw.database.path {
            config.database = DatabaseLocation::parse(&path);
        }
        if let Some(timeout_ms) = raw.database.busy_timeout_ms {
            config.busy_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(level) = raw.logging.level {
            config.log_level = level;
        }
        config.log_dir = raw.logging.dir;
        Ok(config)
    }

    /// Reads and parses a TOML config file.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Applies overrides from the process environment.
    pub fn with_env_overrides(self) -> ConfigResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from `lookup`, keyed by the `ENV_*` names.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> ConfigResult<Self> {
        if let Some(path) = lookup(ENV_DB_PATH) {
            self.database = DatabaseLocation::parse(&path);
        }
        if let Some(value) = lookup(ENV_BUSY_TIMEOUT_MS) {
            let timeout_ms =
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_BUSY_TIMEOUT_MS,
                        value: value.clone(),
                    })?;
            self.busy_timeout = Duration::from_millis(timeout_ms);
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = lookup(ENV_LOG_DIR) {
            let trimmed = dir.trim();
            self.log_dir = (!trimmed.is_empty()).then(|| PathBuf::from(trimmed));
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, DatabaseLocation, StoreConfig, ENV_BUSY_TIMEOUT_MS, ENV_DB_PATH};
    use std::collections::HashMap;
    use std::path::PathBuf;
    use std::time::Duration;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_file_keeps_defaults() {
        let config = StoreConfig::from_toml_str("").unwrap();
        assert_eq!(config, StoreConfig::default());
    }

    #[test]
    fn file_values_are_applied() {
        let config = StoreConfig::from_toml_str(
            r#"
            [database]
            path = ":memory:"
            busy_timeout_ms = 250

            [logging]
            level = "warn"
            dir = "/tmp/taskboard-logs"
            "#,
        )
        .unwrap();

        assert_eq!(config.database, DatabaseLocation::Memory);
        assert_eq!(config.busy_timeout, Duration::from_millis(250));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/tmp/taskboard-logs")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = StoreConfig::from_toml_str("[database]\nurl = \"x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let config = StoreConfig::from_toml_str("[database]\npath = \"a.db\"\n")
            .unwrap()
            .with_overrides(lookup(&[(ENV_DB_PATH, "b.db"), (ENV_BUSY_TIMEOUT_MS, "10")]))
            .unwrap();

        assert_eq!(config.database, DatabaseLocation::File(PathBuf::from("b.db")));
        assert_eq!(config.busy_timeout, Duration::from_millis(10));
    }

    #[test]
    fn malformed_timeout_override_is_reported() {
        let err = StoreConfig::default()
            .with_overrides(lookup(&[(ENV_BUSY_TIMEOUT_MS, "soon")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: ENV_BUSY_TIMEOUT_MS,
                ..
            }
        ));
    }
}
