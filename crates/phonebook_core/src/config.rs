//! Persisted application settings.
//!
//! # Responsibility
//! - Load, validate and persist the settings core operations depend on.
//! - Derive storage and export paths from the configured data directory.
//!
//! # Invariants
//! - Unsupported formats or policies are rejected before any store I/O.
//! - A loaded `Settings` value is an immutable snapshot; callers pass its
//!   fields into core operations instead of sharing mutable state.

use crate::auth::{UniquenessPolicy, UnsupportedPolicyError};
use crate::db::db_path_in;
use crate::export::{SerialFormat, UnsupportedFormatError};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings load/save/validation error.
#[derive(Debug)]
pub enum ConfigError {
    UnsupportedFormat(String),
    UnsupportedPolicy(String),
    /// Data directory does not exist or is not a directory.
    InvalidDataDirectory(PathBuf),
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        message: String,
    },
    Encode(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(value) => {
                write!(f, "{}", UnsupportedFormatError(value.clone()))
            }
            Self::UnsupportedPolicy(value) => {
                write!(f, "{}", UnsupportedPolicyError(value.clone()))
            }
            Self::InvalidDataDirectory(path) => {
                write!(f, "data directory `{}` is not a directory", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "settings file `{}`: {source}", path.display())
            }
            Self::Parse { path, message } => {
                write!(f, "failed to parse settings `{}`: {message}", path.display())
            }
            Self::Encode(message) => write!(f, "failed to encode settings: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<UnsupportedFormatError> for ConfigError {
    fn from(value: UnsupportedFormatError) -> Self {
        Self::UnsupportedFormat(value.0)
    }
}

impl From<UnsupportedPolicyError> for ConfigError {
    fn from(value: UnsupportedPolicyError) -> Self {
        Self::UnsupportedPolicy(value.0)
    }
}

/// Active application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub serial_format: SerialFormat,
    pub write_auth_rule: UniquenessPolicy,
}

/// On-disk shape; values stay raw so unsupported entries surface as typed
/// errors instead of generic parse failures.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    data_dir: Option<String>,
    serial_format: Option<String>,
    write_auth_rule: Option<toml::Value>,
}

impl Settings {
    /// Default settings rooted at `data_dir`.
    pub fn with_defaults(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            serial_format: SerialFormat::default(),
            write_auth_rule: UniquenessPolicy::default(),
        }
    }

    /// Loads settings from `path`, writing defaults there first when missing.
    ///
    /// Missing or empty keys fall back to defaults.
    ///
    /// # Errors
    /// - `UnsupportedFormat`/`UnsupportedPolicy` for values outside the
    ///   supported sets.
    /// - `Io`/`Parse` when the file cannot be read or is not valid TOML.
    pub fn load_or_init(
        path: impl AsRef<Path>,
        default_data_dir: impl Into<PathBuf>,
    ) -> ConfigResult<Self> {
        let path = path.as_ref();
        let defaults = Self::with_defaults(default_data_dir);

        if !path.is_file() {
            info!(
                "event=config_init module=config status=ok path={}",
                path.display()
            );
            defaults.save(path)?;
            return Ok(defaults);
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::parse(&content, defaults).map_err(|err| match err {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;
        debug!(
            "event=config_load module=config status=ok format={} write_auth_rule={}",
            settings.serial_format, settings.write_auth_rule
        );
        Ok(settings)
    }

    /// Parses TOML settings content over `defaults`.
    pub fn parse(content: &str, defaults: Settings) -> ConfigResult<Self> {
        let file: SettingsFile = toml::from_str(content).map_err(|err| ConfigError::Parse {
            path: PathBuf::new(),
            message: err.message().to_string(),
        })?;

        let mut settings = defaults;
        if let Some(dir) = file.data_dir.filter(|dir| !dir.trim().is_empty()) {
            settings.data_dir = PathBuf::from(dir.trim());
        }
        if let Some(format) = file.serial_format {
            settings.serial_format = format.parse()?;
        }
        if let Some(rule) = file.write_auth_rule {
            settings.write_auth_rule = match rule {
                toml::Value::String(name) => name.parse()?,
                toml::Value::Integer(code) => u8::try_from(code)
                    .ok()
                    .and_then(UniquenessPolicy::from_code)
                    .ok_or_else(|| ConfigError::UnsupportedPolicy(code.to_string()))?,
                other => return Err(ConfigError::UnsupportedPolicy(other.to_string())),
            };
        }
        Ok(settings)
    }

    /// Writes these settings to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        let path = path.as_ref();
        let content =
            toml::to_string_pretty(self).map_err(|err| ConfigError::Encode(err.to_string()))?;

        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(
            "event=config_save module=config status=ok path={}",
            path.display()
        );
        Ok(())
    }

    pub fn set_serial_format(&mut self, format: SerialFormat) {
        self.serial_format = format;
    }

    pub fn set_write_auth_rule(&mut self, rule: UniquenessPolicy) {
        self.write_auth_rule = rule;
    }

    /// Points storage and exports at `dir`.
    ///
    /// # Errors
    /// - `InvalidDataDirectory` unless `dir` is an existing directory.
    pub fn set_data_dir(&mut self, dir: impl Into<PathBuf>) -> ConfigResult<()> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(ConfigError::InvalidDataDirectory(dir));
        }
        self.data_dir = dir;
        Ok(())
    }

    /// SQLite file holding the records table.
    pub fn records_db_path(&self) -> PathBuf {
        db_path_in(&self.data_dir)
    }

    /// `records.<ext>` inside the data directory, for the active format.
    pub fn default_export_path(&self) -> PathBuf {
        self.export_path_for(self.serial_format)
    }

    /// `records.<ext>` inside the data directory, for `format`.
    pub fn export_path_for(&self, format: SerialFormat) -> PathBuf {
        self.data_dir
            .join(format!("records.{}", format.extension()))
    }
}
