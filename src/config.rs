//! User configuration, read from `config.toml` inside the application data
//! directory. A missing file means defaults; everything is optional.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".student-marks-manager";
/// Configuration file stored inside the application data directory.
const CONFIG_FILE_NAME: &str = "config.toml";
/// Environment variable that replaces `api.base_url`.
pub const API_URL_ENV: &str = "STUDENT_MARKS_API_URL";

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not locate home directory")]
    NoHomeDir,

    #[error("Failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Config validation failed: {message}")]
    Validation { message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the roster backend lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Whole-request timeout applied to every call.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file name, resolved against the data directory when relative.
    #[serde(default = "default_log_file")]
    pub file: PathBuf,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> PathBuf {
    PathBuf::from("client.log")
}

/// Resolve the application data directory inside the user's home.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dirs = BaseDirs::new().ok_or(ConfigError::NoHomeDir)?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

impl Config {
    /// Load `config.toml` from the data directory and apply the environment
    /// override.
    pub fn load(data_dir: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&data_dir.join(CONFIG_FILE_NAME))?;
        config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    /// Parse a specific file. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn apply_api_url_override(&mut self, url: Option<String>) {
        if let Some(url) = url.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Checks:
    /// - the base URL is an http(s) URL that can take endpoint paths
    /// - the timeout is positive
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api.base_url).map_err(|err| ConfigError::Validation {
            message: format!("api.base_url '{}' is not a URL: {err}", self.api.base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
            return Err(ConfigError::Validation {
                message: format!("api.base_url '{}' must be an http(s) URL", self.api.base_url),
            });
        }

        if self.api.timeout_seconds == 0 {
            return Err(ConfigError::Validation {
                message: "api.timeout_seconds must be greater than zero".to_string(),
            });
        }

        Ok(())
    }

    /// Absolute path of the diagnostic log file.
    pub fn log_path(&self, data_dir: &Path) -> PathBuf {
        if self.logging.file.is_absolute() {
            self.logging.file.clone()
        } else {
            data_dir.join(&self.logging.file)
        }
    }
}
