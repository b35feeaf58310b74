//! Process configuration for store connection and logging.
//!
//! # Responsibility
//! - Parse the store connection string into a concrete target.
//! - Resolve logging level and directory from environment variables.
//!
//! # Invariants
//! - Parsing never reads process environment directly; callers pass a lookup.
//! - A missing connection string is an error, not a silent default.

use crate::logging::default_log_level;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DB_URI_ENV: &str = "PERSON_DB_URI";
pub const LOG_LEVEL_ENV: &str = "PERSON_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "PERSON_LOG_DIR";

const MEMORY_URIS: &[&str] = &["sqlite::memory:", ":memory:"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    MissingConnectionString(&'static str),
    EmptyConnectionString,
    InvalidLogLevel(String),
    RelativeLogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingConnectionString(key) => {
                write!(f, "connection string is not set; expected `{key}`")
            }
            Self::EmptyConnectionString => write!(f, "connection string cannot be empty"),
            Self::InvalidLogLevel(level) => write!(
                f,
                "unsupported log level `{level}`; expected trace|debug|info|warn|error"
            ),
            Self::RelativeLogDir(path) => write!(
                f,
                "log directory must be an absolute path, got `{}`",
                path.display()
            ),
        }
    }
}

impl Error for ConfigError {}

/// Where the person collection lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreTarget {
    Memory,
    File(PathBuf),
}

/// Store connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub target: StoreTarget,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            target: StoreTarget::Memory,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            target: StoreTarget::File(path.into()),
        }
    }

    /// Parses a connection string.
    ///
    /// Accepted forms: `sqlite::memory:`, `:memory:`, `sqlite://<path>`,
    /// `sqlite:<path>` and a bare file path.
    pub fn parse(uri: &str) -> Result<Self, ConfigError> {
        let trimmed = uri.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::EmptyConnectionString);
        }
        if MEMORY_URIS.contains(&trimmed) {
            return Ok(Self::in_memory());
        }

        let path = trimmed
            .strip_prefix("sqlite://")
            .or_else(|| trimmed.strip_prefix("sqlite:"))
            .unwrap_or(trimmed);
        if path.is_empty() {
            return Err(ConfigError::EmptyConnectionString);
        }
        Ok(Self::file(path))
    }

    /// Reads `PERSON_DB_URI` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let uri = lookup(DB_URI_ENV).ok_or(ConfigError::MissingConnectionString(DB_URI_ENV))?;
        Self::parse(&uri)
    }

    /// Short label for log lines; never includes the full path.
    pub fn mode(&self) -> &'static str {
        match self.target {
            StoreTarget::Memory => "memory",
            StoreTarget::File(_) => "file",
        }
    }
}

/// Logging settings.
///
/// Without `dir`, log records go to stderr only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: &'static str,
    pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

impl LogConfig {
    pub fn new(level: &str, dir: Option<&Path>) -> Result<Self, ConfigError> {
        let level = normalize_level(level)
            .ok_or_else(|| ConfigError::InvalidLogLevel(level.trim().to_string()))?;
        let dir = match dir {
            Some(path) if !path.is_absolute() => {
                return Err(ConfigError::RelativeLogDir(path.to_path_buf()))
            }
            Some(path) => Some(path.to_path_buf()),
            None => None,
        };
        Ok(Self { level, dir })
    }

    /// Reads `PERSON_LOG_LEVEL` and `PERSON_LOG_DIR` through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let level = lookup(LOG_LEVEL_ENV).unwrap_or_else(|| default_log_level().to_string());
        let dir = lookup(LOG_DIR_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        Self::new(&level, dir.as_deref())
    }
}

pub(crate) fn normalize_level(level: &str) -> Option<&'static str> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some("trace"),
        "debug" => Some("debug"),
        "info" => Some("info"),
        "warn" | "warning" => Some("warn"),
        "error" => Some("error"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, LogConfig, StoreConfig, StoreTarget, DB_URI_ENV, LOG_DIR_ENV};
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn parse_accepts_memory_forms() {
        assert_eq!(
            StoreConfig::parse("sqlite::memory:").unwrap().target,
            StoreTarget::Memory
        );
        assert_eq!(
            StoreConfig::parse(" :memory: ").unwrap().target,
            StoreTarget::Memory
        );
    }

    #[test]
    fn parse_accepts_file_forms() {
        let expected = StoreTarget::File(PathBuf::from("/var/lib/people.db"));
        assert_eq!(
            StoreConfig::parse("sqlite:///var/lib/people.db").unwrap().target,
            expected
        );
        assert_eq!(
            StoreConfig::parse("sqlite:/var/lib/people.db").unwrap().target,
            expected
        );
        assert_eq!(
            StoreConfig::parse("/var/lib/people.db").unwrap().target,
            expected
        );
        assert_eq!(
            StoreConfig::parse("sqlite://people.db").unwrap().target,
            StoreTarget::File(PathBuf::from("people.db"))
        );
    }

    #[test]
    fn parse_rejects_empty_values() {
        assert_eq!(
            StoreConfig::parse("   ").unwrap_err(),
            ConfigError::EmptyConnectionString
        );
        assert_eq!(
            StoreConfig::parse("sqlite://").unwrap_err(),
            ConfigError::EmptyConnectionString
        );
    }

    #[test]
    fn from_lookup_requires_connection_string() {
        let err = StoreConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingConnectionString(DB_URI_ENV));

        let config =
            StoreConfig::from_lookup(lookup_from(&[(DB_URI_ENV, "sqlite::memory:")])).unwrap();
        assert_eq!(config.mode(), "memory");
    }

    #[test]
    fn log_config_normalizes_level_and_rejects_relative_dir() {
        let config = LogConfig::new(" WARNING ", None).unwrap();
        assert_eq!(config.level, "warn");
        assert_eq!(config.dir, None);

        let err = LogConfig::new("loud", None).unwrap_err();
        assert_eq!(err, ConfigError::InvalidLogLevel("loud".to_string()));

        let err = LogConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "logs/dev")])).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
    }

    #[test]
    fn log_config_ignores_blank_dir() {
        let config = LogConfig::from_lookup(lookup_from(&[(LOG_DIR_ENV, "  ")])).unwrap();
        assert_eq!(config.dir, None);
    }
}
