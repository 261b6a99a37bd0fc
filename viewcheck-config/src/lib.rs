use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Root of the application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub naming: NamingConfig,
    #[serde(default)]
    pub report: ReportConfig,
}

impl AppConfig {
    /// Loads and validates configuration from an explicit path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .naming
            .validate()
            .map_err(|message| ConfigError::Invalid {
                path: path.to_path_buf(),
                message,
            })?;
        Ok(config)
    }

    /// Reads `VIEWCHECK_CONFIG` when set, otherwise `./config/default.toml`.
    /// Falls back to defaults when neither exists.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("VIEWCHECK_CONFIG") {
            return Self::from_file(PathBuf::from(path));
        }

        let default_path = env::current_dir()
            .map(|dir| dir.join("config").join("default.toml"))
            .map_err(|source| ConfigError::Context {
                message: "failed to resolve the current working directory".to_string(),
                source,
            })?;

        if default_path.exists() {
            Self::from_file(default_path)
        } else {
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_string()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
        }
    }
}

/// Overrides for the view naming scheme; unset fields keep the built-in
/// Cyrillic letters and Roman numerals.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamingConfig {
    #[serde(default)]
    pub letters: Option<Vec<String>>,
    #[serde(default)]
    pub numerals: Option<Vec<String>>,
    /// Number of numeral-suffixed generations after the bare letters.
    #[serde(default)]
    pub generations: Option<usize>,
}

impl NamingConfig {
    pub fn validate(&self) -> Result<(), String> {
        for (key, values) in [("letters", &self.letters), ("numerals", &self.numerals)] {
            let Some(values) = values else {
                continue;
            };
            if values.is_empty() {
                return Err(format!("naming.{key} must not be empty"));
            }
            if values.iter().any(|value| value.trim().is_empty()) {
                return Err(format!("naming.{key} must not contain blank entries"));
            }
        }
        if let (Some(generations), Some(numerals)) = (self.generations, &self.numerals) {
            if generations > numerals.len() {
                return Err(format!(
                    "naming.generations ({generations}) exceeds the {} configured numerals",
                    numerals.len()
                ));
            }
        }
        Ok(())
    }
}

/// Where the binary appends report text.
#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(default = "ReportConfig::default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "ReportConfig::default_log_file")]
    pub log_file: String,
}

impl ReportConfig {
    fn default_log_dir() -> PathBuf {
        PathBuf::from("logs")
    }

    fn default_log_file() -> String {
        "viewcheck.log".to_string()
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_dir.join(&self.log_file)
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            log_dir: Self::default_log_dir(),
            log_file: Self::default_log_file(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config file {path:?}: {message}")]
    Invalid { path: PathBuf, message: String },
    #[error("{message}")]
    Context {
        message: String,
        #[source]
        source: std::io::Error,
    },
}
