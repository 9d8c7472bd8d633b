//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where data and logs live and how verbose logging is.
//! - Load settings from an optional TOML file, then environment overrides.
//!
//! # Invariants
//! - Missing file keys fall back to defaults.
//! - Environment variables win over file values.

use crate::logging::{default_log_level, normalize_level};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Overrides `data_dir`.
pub const ENV_DATA_DIR: &str = "RCDASH_DATA_DIR";
/// Overrides `log_level`.
pub const ENV_LOG_LEVEL: &str = "RCDASH_LOG_LEVEL";
/// Overrides `log_dir`.
pub const ENV_LOG_DIR: &str = "RCDASH_LOG_DIR";

const DEFAULT_DATA_DIR: &str = "rcdash-data";
const DEFAULT_DB_FILE_NAME: &str = "rcdash.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Directory holding the SQLite database.
    pub data_dir: PathBuf,
    pub db_file_name: String,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Defaults to `<data_dir>/logs`.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            db_file_name: DEFAULT_DB_FILE_NAME.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Reads a TOML file. A missing file yields defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Applies `RCDASH_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary lookup. Blank values are ignored.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        if let Some(value) = non_blank(ENV_DATA_DIR) {
            self.data_dir = PathBuf::from(value.trim());
        }
        if let Some(value) = non_blank(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = non_blank(ENV_LOG_DIR) {
            self.log_dir = Some(PathBuf::from(value.trim()));
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if self.db_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid("db_file_name cannot be empty".to_string()));
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("data_dir cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(self.db_file_name.trim())
    }

    /// Absolute log directory, resolved against the working directory when
    /// configured relative.
    pub fn resolved_log_dir(&self) -> PathBuf {
        let dir = self
            .log_dir
            .clone()
            .unwrap_or_else(|| self.data_dir.join("logs"));
        if dir.is_absolute() {
            dir
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&dir))
                .unwrap_or(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, ENV_DATA_DIR, ENV_LOG_LEVEL};
    use std::path::PathBuf;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config = CoreConfig::from_toml_str("data_dir = \"/srv/rcdash\"").unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/srv/rcdash"));
        assert_eq!(config.db_file_name, CoreConfig::default().db_file_name);
        assert_eq!(config.db_path(), PathBuf::from("/srv/rcdash/rcdash.sqlite3"));
        assert_eq!(config.resolved_log_dir(), PathBuf::from("/srv/rcdash/logs"));
    }

    #[test]
    fn overrides_win_and_blank_values_are_ignored() {
        let config = CoreConfig::default()
            .with_overrides(|key| match key {
                ENV_DATA_DIR => Some("/tmp/override".to_string()),
                ENV_LOG_LEVEL => Some("  ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/override"));
        assert_eq!(config.log_level, CoreConfig::default().log_level);
    }

    #[test]
    fn unknown_log_level_is_rejected() {
        let err = CoreConfig::from_toml_str("log_level = \"chatty\"").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, CoreConfig::default());
    }
}
