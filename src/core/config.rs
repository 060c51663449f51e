//! Logger configuration
//!
//! Values here are the fallbacks every logger uses for settings it was not
//! given explicitly. They are read on each query, so updating a
//! [`SharedConfig`] is visible to existing loggers on their next call.

use super::error::{LoggerError, Result};
use super::memory::MemoryDisplay;
use parking_lot::{RwLock, RwLockReadGuard};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

/// Prefix of every environment variable read by [`LoggerConfig::from_env`]
pub const ENV_PREFIX: &str = "LOGGER_";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub is_rotate_log: bool,
    pub retention_days: i64,
    /// Plain-text template
    pub log_format: String,
    /// Comma separated token list for structured output
    pub log_format_json: String,
    pub base_directory: PathBuf,
    /// strftime pattern for the default file name
    pub file_name_format: String,
    pub file_extension: String,
    /// strftime pattern for the `%datetime%` token
    pub datetime_format: String,
    pub file_mode: u32,
    /// Numeric user id; account names are not resolved
    pub file_owner: Option<u32>,
    /// Numeric group id
    pub file_group: Option<u32>,
    pub is_memory_real_usage: bool,
    pub is_memory_format: bool,
    pub memory_precision: usize,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            is_rotate_log: true,
            retention_days: 7,
            log_format: "[%datetime%] %level%: %message%".to_string(),
            log_format_json: "datetime, level, message".to_string(),
            base_directory: PathBuf::from("logs"),
            file_name_format: "%Y-%m-%d".to_string(),
            file_extension: "log".to_string(),
            datetime_format: "%Y-%m-%d %H:%M:%S".to_string(),
            file_mode: 0o666,
            file_owner: None,
            file_group: None,
            is_memory_real_usage: true,
            is_memory_format: true,
            memory_precision: 2,
        }
    }
}

impl LoggerConfig {
    /// Load from `LOGGER_*` environment variables, defaulting anything unset.
    ///
    /// # Errors
    ///
    /// Returns [`LoggerError::InvalidConfiguration`] when a variable is set
    /// but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Load from an arbitrary set of key/value pairs using the same keys as
    /// [`LoggerConfig::from_env`]. Keys without the prefix are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Self::default();

        for (key, value) in vars {
            let Some(name) = key.as_ref().strip_prefix(ENV_PREFIX) else {
                continue;
            };
            let key = key.as_ref();
            let value = value.as_ref().trim();

            match name {
                "IS_ROTATE_LOG" => config.is_rotate_log = parse_bool(key, value)?,
                "RETENTION_DAYS" => config.retention_days = parse_number(key, value)?,
                "LOG_FORMAT" => config.log_format = value.to_string(),
                "LOG_FORMAT_JSON" => config.log_format_json = value.to_string(),
                "BASE_DIRECTORY" => config.base_directory = PathBuf::from(value),
                "FILE_NAME_FORMAT" => config.file_name_format = value.to_string(),
                "FILE_EXTENSION" => config.file_extension = value.to_string(),
                "DATETIME_FORMAT" => config.datetime_format = value.to_string(),
                "FILE_MODE" => config.file_mode = parse_mode(key, value)?,
                "FILE_OWNER" => config.file_owner = Some(parse_number(key, value)?),
                "FILE_GROUP" => config.file_group = Some(parse_number(key, value)?),
                "IS_MEMORY_REAL_USAGE" => config.is_memory_real_usage = parse_bool(key, value)?,
                "IS_MEMORY_FORMAT" => config.is_memory_format = parse_bool(key, value)?,
                "MEMORY_PRECISION" => config.memory_precision = parse_number(key, value)?,
                _ => {}
            }
        }

        Ok(config)
    }

    /// Structured token list with whitespace removed
    pub fn json_tokens(&self) -> Vec<String> {
        self.log_format_json
            .split(',')
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .collect()
    }

    pub fn memory_display(&self) -> MemoryDisplay {
        MemoryDisplay {
            format: self.is_memory_format,
            precision: self.memory_precision,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LoggerError::config(
            key,
            format!("expected a boolean, got '{}'", value),
        )),
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| LoggerError::config(key, format!("expected a number, got '{}'", value)))
}

/// Octal file mode, with or without a `0o`/`0` prefix.
fn parse_mode(key: &str, value: &str) -> Result<u32> {
    let digits = value.strip_prefix("0o").unwrap_or(value);
    u32::from_str_radix(digits, 8)
        .map_err(|_| LoggerError::config(key, format!("expected an octal mode, got '{}'", value)))
}

/// Configuration handle shared between a factory and the loggers it makes
#[derive(Debug, Clone, Default)]
pub struct SharedConfig {
    inner: Arc<RwLock<LoggerConfig>>,
}

impl SharedConfig {
    pub fn new(config: LoggerConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn read(&self) -> RwLockReadGuard<'_, LoggerConfig> {
        self.inner.read()
    }

    /// Apply a change that loggers observe on their next query.
    pub fn update<F>(&self, change: F)
    where
        F: FnOnce(&mut LoggerConfig),
    {
        change(&mut self.inner.write());
    }
}

impl From<LoggerConfig> for SharedConfig {
    fn from(config: LoggerConfig) -> Self {
        Self::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LoggerConfig::default();
        assert!(config.is_rotate_log);
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.base_directory, PathBuf::from("logs"));
        assert_eq!(config.file_extension, "log");
        assert_eq!(config.json_tokens(), vec!["datetime", "level", "message"]);
        assert_eq!(config.file_mode, 0o666);
    }

    #[test]
    fn test_from_vars_overrides() {
        let config = LoggerConfig::from_vars([
            ("LOGGER_IS_ROTATE_LOG", "false"),
            ("LOGGER_RETENTION_DAYS", "30"),
            ("LOGGER_BASE_DIRECTORY", "/var/log/app"),
            ("LOGGER_FILE_MODE", "0640"),
            ("LOGGER_FILE_OWNER", "1000"),
            ("LOGGER_MEMORY_PRECISION", "1"),
            ("HOME", "/root"),
        ])
        .unwrap();

        assert!(!config.is_rotate_log);
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.base_directory, PathBuf::from("/var/log/app"));
        assert_eq!(config.file_mode, 0o640);
        assert_eq!(config.file_owner, Some(1000));
        assert_eq!(config.file_group, None);
        assert_eq!(config.memory_precision, 1);
    }

    #[test]
    fn test_from_vars_rejects_malformed() {
        let err = LoggerConfig::from_vars([("LOGGER_RETENTION_DAYS", "a week")]).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("LOGGER_RETENTION_DAYS"));

        assert!(LoggerConfig::from_vars([("LOGGER_IS_MEMORY_FORMAT", "maybe")]).is_err());
        assert!(LoggerConfig::from_vars([("LOGGER_FILE_MODE", "rw-r--r--")]).is_err());
    }

    #[test]
    fn test_owner_and_group_must_be_numeric() {
        let config =
            LoggerConfig::from_vars([("LOGGER_FILE_OWNER", "1000"), ("LOGGER_FILE_GROUP", "33")])
                .unwrap();
        assert_eq!(config.file_owner, Some(1000));
        assert_eq!(config.file_group, Some(33));

        let err = LoggerConfig::from_vars([("LOGGER_FILE_OWNER", "www-data")]).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("LOGGER_FILE_OWNER"));

        let err = LoggerConfig::from_vars([("LOGGER_FILE_GROUP", "adm")]).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: LoggerConfig =
            serde_json::from_str(r#"{"retention_days": 3, "file_extension": "txt"}"#).unwrap();
        assert_eq!(config.retention_days, 3);
        assert_eq!(config.file_extension, "txt");
        assert_eq!(config.log_format, LoggerConfig::default().log_format);
    }

    #[test]
    fn test_shared_update_is_visible() {
        let shared = SharedConfig::default();
        let other = shared.clone();
        shared.update(|config| config.retention_days = 1);
        assert_eq!(other.read().retention_days, 1);
    }

    #[test]
    fn test_json_tokens_trimmed() {
        let config = LoggerConfig {
            log_format_json: " level ,%memory%,, message ".to_string(),
            ..LoggerConfig::default()
        };
        assert_eq!(config.json_tokens(), ["level", "%memory%", "message"]);
    }
}
