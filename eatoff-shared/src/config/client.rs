//! Client settings: defaults, files, environment variables and overrides.

use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use strum::{Display, EnumString};
use thiserror::Error;
use tracing::debug;
use url::Url;

const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api/";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Errors raised while resolving the client configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid in its format.
    #[error("failed to parse configuration file {path}: {message}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },
    /// The configuration could not be rendered.
    #[error("failed to serialize configuration: {0}")]
    Serialize(String),
    /// Unknown file extension or format name.
    #[error("unsupported configuration format '{0}'; use yaml, json or toml")]
    UnsupportedFormat(String),
    /// An environment variable holds an unusable value.
    #[error("invalid value '{value}' for {var}")]
    InvalidEnv {
        /// Variable name.
        var: &'static str,
        /// Rejected value.
        value: String,
    },
    /// Resolved values failed validation.
    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Serialization formats understood by [`ClientConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ConfigFormat {
    /// YAML, `.yaml` or `.yml`.
    #[strum(serialize = "yaml", serialize = "yml")]
    Yaml,
    /// JSON, `.json`.
    Json,
    /// TOML, `.toml`.
    Toml,
}

impl ConfigFormat {
    /// Detect the format from a file extension.
    ///
    /// # Errors
    /// [`ConfigError::UnsupportedFormat`] for unknown extensions.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension
            .parse()
            .map_err(|_| ConfigError::UnsupportedFormat(extension.to_string()))
    }

    /// Conventional file name for a generated configuration.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Yaml => "eatoff.yaml",
            Self::Json => "eatoff.json",
            Self::Toml => "eatoff.toml",
        }
    }
}

/// Settings for the `EatOff` client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of the REST API; request paths are joined onto it.
    pub api_base_url: String,

    /// TCP connect timeout in seconds.
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds.
    pub request_timeout_secs: u64,

    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,

    /// Directory holding the persisted session preferences.
    pub data_dir: PathBuf,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            connect_timeout_secs: DEFAULT_TIMEOUT_SECS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            data_dir: default_data_dir(),
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Precedence, lowest first: defaults, the file at `config_path`, the
    /// `EATOFF_*` environment variables (only for values still at their
    /// defaults), then `base_url_override`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when the file cannot be read or parsed, an
    /// environment variable is malformed, or the result fails validation.
    pub fn load_config(
        config_path: Option<PathBuf>,
        base_url_override: Option<String>,
    ) -> Result<Self, ConfigError> {
        Self::load_config_with(config_path, base_url_override, |var| env::var(var).ok())
    }

    /// [`ClientConfig::load_config`] with `lookup` standing in for the process
    /// environment.
    ///
    /// # Errors
    /// Same as [`ClientConfig::load_config`].
    pub fn load_config_with<F>(
        config_path: Option<PathBuf>,
        base_url_override: Option<String>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::with_defaults();
        let mut config = match config_path {
            Some(path) => Self::from_file(&path)?,
            None => defaults.clone(),
        };

        if config.api_base_url == defaults.api_base_url {
            if let Some(url) = lookup("EATOFF_API_BASE_URL") {
                config.api_base_url = url;
            }
        }
        if config.log_level == defaults.log_level {
            if let Some(level) = lookup("EATOFF_LOG_LEVEL") {
                config.log_level = level;
            }
        }
        if config.data_dir == defaults.data_dir {
            if let Some(dir) = lookup("EATOFF_DATA_DIR") {
                config.data_dir = PathBuf::from(dir);
            }
        }
        if config.request_timeout_secs == defaults.request_timeout_secs {
            if let Some(value) = lookup("EATOFF_TIMEOUT_SECS") {
                config.request_timeout_secs = value.parse().map_err(|_| ConfigError::InvalidEnv {
                    var: "EATOFF_TIMEOUT_SECS",
                    value,
                })?;
            }
        }

        if let Some(url) = base_url_override {
            config.api_base_url = url;
        }

        config.api_base_url = normalize_base_url(&config.api_base_url);
        config.validate().map_err(ConfigError::Invalid)?;
        debug!(
            api_base_url = %config.api_base_url,
            data_dir = %config.data_dir.display(),
            "configuration loaded"
        );
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            message,
        };

        match format {
            ConfigFormat::Yaml => serde_yml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Render the configuration in the given format.
    ///
    /// # Errors
    /// Returns [`ConfigError::Serialize`] if the serializer fails.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let rendered = match format {
            ConfigFormat::Yaml => serde_yml::to_string(self).map_err(|e| e.to_string()),
            ConfigFormat::Json => serde_json::to_string_pretty(self).map_err(|e| e.to_string()),
            ConfigFormat::Toml => toml::to_string_pretty(self).map_err(|e| e.to_string()),
        };
        rendered.map_err(ConfigError::Serialize)
    }

    /// Parsed API base URL.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when the URL does not parse.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        Url::parse(&normalize_base_url(&self.api_base_url)).map_err(|err| {
            ConfigError::Invalid(vec![format!(
                "invalid api_base_url '{}': {err}",
                self.api_base_url
            )])
        })
    }

    /// Validate the configuration, collecting every problem found.
    ///
    /// # Errors
    /// Returns the list of validation messages when any check fails.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match Url::parse(&self.api_base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            Ok(url) => errors.push(format!(
                "api_base_url must use http or https, got '{}'",
                url.scheme()
            )),
            Err(err) => errors.push(format!(
                "invalid api_base_url '{}': {err}",
                self.api_base_url
            )),
        }

        if self.connect_timeout_secs == 0 {
            errors.push("connect_timeout_secs must be greater than 0".to_string());
        }
        if self.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be greater than 0".to_string());
        }
        if self.log_level.trim().is_empty() {
            errors.push("log_level must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn default_data_dir() -> PathBuf {
    BaseDirs::new().map_or_else(
        || PathBuf::from("./.eatoff"),
        |dirs| dirs.config_dir().join("eatoff"),
    )
}

/// Ensure the base URL ends with `/` so relative joins keep its path.
fn normalize_base_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    }
}
