use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable consulted when the config file has no API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// OpenWeatherMap's geocoding endpoint never returns more than this many matches.
const MAX_SUGGESTIONS: usize = 5;

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

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Weather API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Fallback location used when none is given on the command line
    #[serde(default)]
    pub location: LocationConfig,
}

/// Measurement system requested from the weather API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    Standard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Falls back to `OPENWEATHER_API_KEY` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL for the data and geocoding endpoints
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL for condition icons
    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    /// Unit system for temperatures and wind speed
    #[serde(default)]
    pub units: Units,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Number of forecast samples kept for the hourly series
    #[serde(default = "default_hourly_limit")]
    pub hourly_limit: usize,

    /// Number of hourly points drawn in the temperature chart
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,

    /// Number of upcoming days summarized (the current day is skipped)
    #[serde(default = "default_forecast_days")]
    pub forecast_days: usize,

    /// Maximum number of city suggestions requested
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

fn default_api_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_hourly_limit() -> usize {
    8
}

fn default_chart_points() -> usize {
    4
}

fn default_forecast_days() -> usize {
    3
}

fn default_suggestion_limit() -> usize {
    MAX_SUGGESTIONS
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base_url: default_api_base_url(),
            icon_base_url: default_icon_base_url(),
            units: Units::default(),
            request_timeout_secs: default_request_timeout_secs(),
            hourly_limit: default_hourly_limit(),
            chart_points: default_chart_points(),
            forecast_days: default_forecast_days(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

impl WeatherConfig {
    /// Check if an API key is present (not empty or a placeholder)
    pub fn has_api_key(&self) -> bool {
        self.api_key
            .as_deref()
            .map(|k| !k.trim().is_empty() && !k.starts_with("YOUR_"))
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    /// City looked up when no location is passed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_city: Option<String>,

    /// Latitude used when neither a city nor coordinates are passed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_latitude: Option<f64>,

    /// Longitude paired with `default_latitude`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_longitude: Option<f64>,
}

impl Config {
    /// Load configuration from the default path, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from `path`, creating a default file if it doesn't exist.
    ///
    /// Environment overrides are applied after the file is read, so a key
    /// from the environment is never written back to disk.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;

            toml::from_str::<Config>(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            let config = Self::default();
            config.save_to(path)?;
            tracing::info!("Created default config at {}", path.display());
            config
        };

        Ok(config.with_env_overrides())
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated(path: Option<&Path>) -> Result<(Self, ValidationResult)> {
        let config = match path {
            Some(p) => Self::load_from(p)?,
            None => Self::load()?,
        };
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

    fn with_env_overrides(mut self) -> Self {
        self.apply_api_key_override(std::env::var(API_KEY_ENV).ok());
        self
    }

    /// Use `env_value` as the API key unless the file already provides one.
    fn apply_api_key_override(&mut self, env_value: Option<String>) {
        if self.weather.has_api_key() {
            return;
        }
        if let Some(key) = env_value.filter(|k| !k.trim().is_empty()) {
            tracing::debug!("Using API key from {}", API_KEY_ENV);
            self.weather.api_key = Some(key);
        }
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let weather = &self.weather;

        self.validate_url(&weather.api_base_url, "weather.api_base_url", &mut result);
        self.validate_url(&weather.icon_base_url, "weather.icon_base_url", &mut result);

        if !weather.has_api_key() {
            result.add_warning(
                "weather.api_key",
                format!(
                    "No API key configured - set {} or weather.api_key",
                    API_KEY_ENV
                ),
            );
        }

        if weather.request_timeout_secs == 0 {
            result.add_error(
                "weather.request_timeout_secs",
                "Request timeout must be greater than 0",
            );
        } else if weather.request_timeout_secs > 120 {
            result.add_warning(
                "weather.request_timeout_secs",
                "Request timeout is unusually long (>120s)",
            );
        }

        if weather.hourly_limit == 0 {
            result.add_error(
                "weather.hourly_limit",
                "Hourly limit must be greater than 0",
            );
        }

        if weather.chart_points == 0 {
            result.add_error("weather.chart_points", "Chart needs at least one point");
        } else if weather.chart_points > weather.hourly_limit {
            result.add_warning(
                "weather.chart_points",
                "Chart points exceed hourly limit; chart will show at most hourly_limit points",
            );
        }

        if weather.forecast_days == 0 {
            result.add_error(
                "weather.forecast_days",
                "Forecast days must be greater than 0",
            );
        } else if weather.forecast_days > 5 {
            result.add_warning(
                "weather.forecast_days",
                "The 5-day forecast endpoint cannot cover more than 5 days",
            );
        }

        if weather.suggestion_limit == 0 {
            result.add_warning("weather.suggestion_limit", "City suggestions disabled (0)");
        } else if weather.suggestion_limit > MAX_SUGGESTIONS {
            result.add_warning(
                "weather.suggestion_limit",
                format!("Geocoding returns at most {} matches", MAX_SUGGESTIONS),
            );
        }

        self.validate_location(&mut result);

        result
    }

    fn validate_location(&self, result: &mut ValidationResult) {
        let loc = &self.location;

        match (loc.default_latitude, loc.default_longitude) {
            (Some(lat), Some(lon)) => {
                if !(-90.0..=90.0).contains(&lat) {
                    result.add_error(
                        "location.default_latitude",
                        format!("Latitude out of range: {}", lat),
                    );
                }
                if !(-180.0..=180.0).contains(&lon) {
                    result.add_error(
                        "location.default_longitude",
                        format!("Longitude out of range: {}", lon),
                    );
                }
            }
            (Some(_), None) | (None, Some(_)) => {
                result.add_error(
                    "location",
                    "default_latitude and default_longitude must be set together",
                );
            }
            (None, None) => {}
        }

        if let Some(city) = &loc.default_city {
            if city.trim().is_empty() {
                result.add_warning("location.default_city", "Default city is empty");
            }
        }
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

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
