use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Directory snapshots are written to.
pub const OUTPUT_DIR_ENV: &str = "WEATHER_INFO_DIR";
/// OpenWeatherMap API credential.
pub const API_KEY_ENV: &str = "OPEN_WEATHER_API_KEY";
/// Optional override for the current-weather endpoint.
pub const API_URL_ENV: &str = "OPEN_WEATHER_URL";

const DEFAULT_API_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
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

    /// Get a message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Resolved application configuration.
///
/// `output_dir` and `api_key` are required; everything else has a default.
#[derive(Clone)]
pub struct Config {
    /// Directory weather snapshots are written to
    pub output_dir: PathBuf,

    /// OpenWeatherMap API key
    pub api_key: String,

    /// Endpoint and cache settings
    pub weather: WeatherConfig,

    /// Retry policy for the weather request
    pub retry: RetrySettings,
}

// Hand-written so the API key never ends up in a log line.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("output_dir", &self.output_dir)
            .field("api_key", &"<redacted>")
            .field("weather", &self.weather)
            .field("retry", &self.retry)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Current-weather endpoint
    pub api_base_url: String,

    /// How long a fetched response is reused, in minutes
    pub cache_ttl_minutes: u32,

    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cache_ttl_minutes: 30,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts after the first one
    pub max_retries: u32,

    /// Delay before the first retry (doubles each attempt)
    pub initial_delay_ms: u64,

    /// Upper bound on the delay between attempts
    pub max_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 100,
            max_delay_ms: 2000,
        }
    }
}

/// On-disk shape of `config.toml`. Every field is optional; the
/// environment fills in or overrides what is missing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ConfigFile {
    output_dir: Option<PathBuf>,
    api_key: Option<String>,
    weather: WeatherConfig,
    retry: RetrySettings,
}

impl ConfigFile {
    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound(path.display().to_string())
            } else {
                ConfigError::Io(e)
            }
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    fn resolve<F>(self, env: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let output_dir = lookup(OUTPUT_DIR_ENV)
            .map(PathBuf::from)
            .or(self.output_dir)
            .ok_or_else(|| ConfigError::MissingSetting(OUTPUT_DIR_ENV.to_string()))?;

        let api_key = lookup(API_KEY_ENV)
            .or(self.api_key)
            .ok_or_else(|| ConfigError::MissingSetting(API_KEY_ENV.to_string()))?;

        let mut weather = self.weather;
        if let Some(url) = lookup(API_URL_ENV) {
            weather.api_base_url = url;
        }

        Ok(Config {
            output_dir,
            api_key,
            weather,
            retry: self.retry,
        })
    }
}

impl Config {
    /// Build a config with default tunables.
    pub fn new(output_dir: impl Into<PathBuf>, api_key: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            api_key: api_key.into(),
            weather: WeatherConfig::default(),
            retry: RetrySettings::default(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// `explicit` names a TOML file that must exist. Without it the default
    /// location is read when present and skipped otherwise.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingSetting` when the output directory or the
    /// API key is supplied by neither the file nor the environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => Self::default_config_path().filter(|p| p.exists()),
        };

        Self::load_from(path.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an optional file and an environment lookup.
    ///
    /// # Errors
    /// See [`Config::load`].
    pub fn load_from<F>(path: Option<&Path>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = match path {
            Some(p) => {
                tracing::debug!("Reading config file {}", p.display());
                ConfigFile::read(p)?
            }
            None => ConfigFile::default(),
        };

        file.resolve(env)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(explicit: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = Self::load(explicit)?;
        let validation = config.validate();

        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.api_base_url, "weather.api_base_url", &mut result);

        if self.api_key.starts_with("YOUR_") {
            result.add_error("api_key", "API key is still a placeholder");
        }

        if self.output_dir.exists() && !self.output_dir.is_dir() {
            result.add_error(
                "output_dir",
                format!("Path is not a directory: {}", self.output_dir.display()),
            );
        } else if !self.output_dir.exists() {
            result.add_warning(
                "output_dir",
                format!("Path does not exist: {}", self.output_dir.display()),
            );
        }

        if self.weather.cache_ttl_minutes == 0 {
            result.add_error("weather.cache_ttl_minutes", "Cache TTL must be greater than 0");
        }

        if self.weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        }

        if self.retry.max_retries > 10 {
            result.add_warning("retry.max_retries", "Retry count is unusually large (>10)");
        }

        if self.retry.max_delay_ms < self.retry.initial_delay_ms {
            result.add_warning(
                "retry.max_delay_ms",
                "Max delay is smaller than the initial delay; every retry waits max_delay_ms",
            );
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

    /// Default location of the optional config file
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("zipweather").join("config.toml"))
    }
}
