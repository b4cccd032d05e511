use anyhow::{Context, Result};
use habitdash_weather::Units;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::{AppError, ConfigError};

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Weather dashboard settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Where store snapshots are kept
    #[serde(default)]
    pub storage: StorageConfig,

    /// Habit tracker settings
    #[serde(default)]
    pub habits: HabitsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API root
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// API key as written in the config file
    #[serde(default)]
    pub api_key: String,

    #[serde(default)]
    pub units: Units,

    /// Language for condition descriptions (empty = API default)
    #[serde(default)]
    pub lang: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// City fetched on startup (empty = none)
    #[serde(default)]
    pub default_city: String,

    /// Key read from `OPENWEATHER_API_KEY` at load time; never saved
    #[serde(skip)]
    env_api_key: Option<String>,
}

fn default_api_base_url() -> String {
    habitdash_weather::DEFAULT_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

impl WeatherConfig {
    /// Configured key, or the environment key when the file has none
    pub fn api_key(&self) -> &str {
        match (&self.env_api_key, self.api_key.is_empty()) {
            (Some(key), true) => key,
            _ => &self.api_key,
        }
    }

    pub fn is_configured(&self) -> bool {
        let key = self.api_key();
        !key.is_empty() && !key.starts_with("YOUR_")
    }
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            api_key: String::new(),
            units: Units::Metric,
            lang: String::new(),
            request_timeout_secs: default_request_timeout_secs(),
            default_city: String::new(),
            env_api_key: None,
        }
    }
}

/// Persisted store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing survives a restart
    Memory,
    /// One JSON file per store
    #[default]
    File,
    /// Single SQLite database
    Sqlite,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Data directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured data directory, or the platform data dir
    pub fn effective_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("habitdash")
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HabitsConfig {
    /// Category given to habits created without one
    #[serde(default = "default_category")]
    pub default_category: String,
}

fn default_category() -> String {
    habitdash_habits::DEFAULT_CATEGORY.to_string()
}

impl Default for HabitsConfig {
    fn default() -> Self {
        Self {
            default_category: default_category(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("habitdash");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            storage: StorageConfig::default(),
            habits: HabitsConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str::<Config>(&contents).context("Failed to parse config file")?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            config
        };

        config.weather.env_api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` if validation finds critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), AppError> {
        Self::load()?.into_validated()
    }

    /// Validate, logging warnings and rejecting critical errors
    pub fn into_validated(self) -> Result<(Self, ValidationResult), AppError> {
        let validation = self.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((self, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if !self.weather.is_configured() {
            result.add_warning(
                "weather.api_key",
                "Weather API key not configured - the weather dashboard will be unavailable",
            );
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if self.weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if self.habits.default_category.trim().is_empty() {
            result.add_error("habits.default_category", "Default category cannot be empty");
        }

        if self.storage.backend != StorageBackend::Memory {
            let data_dir = self.storage.effective_data_dir();
            if data_dir.exists() && !data_dir.is_dir() {
                result.add_error(
                    "storage.data_dir",
                    format!("Path is not a directory: {}", data_dir.display()),
                );
            }
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("habitdash");

        Ok(config_dir.join("config.toml"))
    }
}
