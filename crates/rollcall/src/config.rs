//! Configuration management for rollcall.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "rollcall";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `ROLLCALL_`, sections split on `__`)
/// 2. TOML config file at `~/.config/rollcall/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Change notification configuration.
    pub notifier: NotifierConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host name or address to bind.
    pub host: String,
    /// TCP port to bind.
    pub port: u16,
}

/// Storage-related configuration.
///
/// Maps each collection to its backing file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the collection files.
    /// Defaults to `~/.local/share/rollcall`
    pub data_dir: Option<PathBuf>,
    /// File name of the students collection.
    pub students_file: String,
    /// File name of the attendance collection.
    pub attendance_file: String,
    /// Write full rewrites to a temporary file and rename it into place.
    pub atomic_rewrite: bool,
}

/// Change notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Number of undelivered events buffered per observer before it lags.
    pub channel_capacity: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Will be resolved to default at runtime
            students_file: "students.csv".to_string(),
            attendance_file: "attendance.csv".to_string(),
            atomic_rewrite: true,
        }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl StorageConfig {
    /// Storage rooted at an explicit directory, with default file names.
    #[must_use]
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            ..Self::default()
        }
    }

    /// Get the data directory, resolving defaults if not set.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(Config::default_data_dir)
    }

    /// Full path to the students file.
    #[must_use]
    pub fn students_path(&self) -> PathBuf {
        self.data_dir().join(&self.students_file)
    }

    /// Full path to the attendance file.
    #[must_use]
    pub fn attendance_path(&self) -> PathBuf {
        self.data_dir().join(&self.attendance_file)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `ROLLCALL_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("ROLLCALL_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host must not be empty".to_string(),
            });
        }

        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        for (key, name) in [
            ("students_file", &self.storage.students_file),
            ("attendance_file", &self.storage.attendance_file),
        ] {
            if name.trim().is_empty() {
                return Err(Error::ConfigValidation {
                    message: format!("storage.{key} must not be empty"),
                });
            }
        }

        if self.storage.students_file == self.storage.attendance_file {
            return Err(Error::ConfigValidation {
                message: format!(
                    "students_file and attendance_file must differ (both are '{}')",
                    self.storage.students_file
                ),
            });
        }

        if self.notifier.channel_capacity == 0 {
            return Err(Error::ConfigValidation {
                message: "notifier.channel_capacity must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// The `host:port` string the server binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
