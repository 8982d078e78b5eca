//! Configuration management for `tempcast`
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::TempcastError;
use crate::models::OutlookThresholds;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for `tempcast`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TempcastConfig {
    /// Weather service configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// History window settings
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Fixed options and cosmetics of the prediction page
    #[serde(default)]
    pub shell: ShellConfig,
}

/// Weather service configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Geocoding search endpoint
    #[serde(default = "default_geocoding_url")]
    pub geocoding_url: String,
    /// Historical archive endpoint
    #[serde(default = "default_archive_url")]
    pub archive_url: String,
    /// Timeout for each external request in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_seconds: u32,
}

/// History window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Number of days before today where the history window starts
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    /// Upper bound for a whole prediction request in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u32,
}

/// Immutable startup options of the prediction page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Page title
    #[serde(default = "default_title")]
    pub title: String,
    /// Cities offered for selection
    #[serde(default = "default_cities")]
    pub cities: Vec<String>,
    /// Temperature bands for the outlook message
    #[serde(default)]
    pub outlook: OutlookThresholds,
}

// Default value functions
fn default_geocoding_url() -> String {
    "https://geocoding-api.open-meteo.com/v1/search".to_string()
}

fn default_archive_url() -> String {
    "https://archive-api.open-meteo.com/v1/archive".to_string()
}

fn default_weather_timeout() -> u32 {
    30
}

fn default_history_days() -> u32 {
    120
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout() -> u32 {
    90
}

fn default_title() -> String {
    "Future Temperature Predictor".to_string()
}

fn default_cities() -> Vec<String> {
    ["Kolkata", "Delhi", "Mumbai", "Chennai", "Bengaluru", "Hyderabad"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            geocoding_url: default_geocoding_url(),
            archive_url: default_archive_url(),
            timeout_seconds: default_weather_timeout(),
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            cities: default_cities(),
            outlook: OutlookThresholds::default(),
        }
    }
}

impl ShellConfig {
    /// Look up a city in the fixed list, ignoring case and surrounding space.
    /// Returns the configured spelling.
    #[must_use]
    pub fn find_city(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.cities
            .iter()
            .find(|city| city.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

impl TempcastConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Environment overrides, e.g. TEMPCAST_SERVER__PORT=9000
        builder = builder.add_source(
            Environment::with_prefix("TEMPCAST")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("shell.cities")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: TempcastConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("tempcast").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.weather.geocoding_url.is_empty() {
            self.weather.geocoding_url = default_geocoding_url();
        }
        if self.weather.archive_url.is_empty() {
            self.weather.archive_url = default_archive_url();
        }
        if self.weather.timeout_seconds == 0 {
            self.weather.timeout_seconds = default_weather_timeout();
        }
        if self.forecast.history_days == 0 {
            self.forecast.history_days = default_history_days();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.request_timeout_seconds == 0 {
            self.server.request_timeout_seconds = default_request_timeout();
        }
        if self.shell.title.is_empty() {
            self.shell.title = default_title();
        }
        self.shell.cities.retain(|city| !city.trim().is_empty());
        if self.shell.cities.is_empty() {
            self.shell.cities = default_cities();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.weather.timeout_seconds > 300 {
            return Err(
                TempcastError::config("Weather request timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.forecast.history_days < 4 {
            return Err(TempcastError::config(
                "History window must cover at least 4 days to fit a cubic trend",
            )
            .into());
        }

        if self.forecast.history_days > 3660 {
            return Err(
                TempcastError::config("History window cannot exceed 3660 days").into(),
            );
        }

        if self.shell.outlook.chilly_below > self.shell.outlook.hot_from {
            return Err(TempcastError::config(
                "Outlook threshold chilly_below must not exceed hot_from",
            )
            .into());
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(TempcastError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(TempcastError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        for (label, url) in [
            ("geocoding", &self.weather.geocoding_url),
            ("archive", &self.weather.archive_url),
        ] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(TempcastError::config(format!(
                    "Weather {label} URL must be a valid HTTP or HTTPS URL"
                ))
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = TempcastConfig::default();
        assert_eq!(
            config.weather.geocoding_url,
            "https://geocoding-api.open-meteo.com/v1/search"
        );
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.forecast.history_days, 120);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.shell.cities.len(), 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = TempcastConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = TempcastConfig::default();
        config.weather.timeout_seconds = 500;
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));

        let mut config = TempcastConfig::default();
        config.forecast.history_days = 3;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = TempcastConfig::default();
        config.weather.archive_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("archive URL"));
    }

    #[test]
    fn test_apply_defaults_restores_empty_values() {
        let mut config = TempcastConfig::default();
        config.weather.timeout_seconds = 0;
        config.shell.cities = vec!["  ".to_string()];
        config.apply_defaults();
        assert_eq!(config.weather.timeout_seconds, 30);
        assert_eq!(config.shell.cities.len(), 6);
    }

    #[test]
    fn test_find_city_is_case_insensitive() {
        let shell = ShellConfig::default();
        assert_eq!(shell.find_city(" kolkata "), Some("Kolkata"));
        assert_eq!(shell.find_city("Paris"), None);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = std::env::temp_dir().join(format!("tempcast-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[forecast]\nhistory_days = 60\n\n[shell]\ncities = [\"Pune\", \"Delhi\"]\n"
        )
        .unwrap();

        let config = TempcastConfig::load_from_path(Some(path)).unwrap();
        assert_eq!(config.forecast.history_days, 60);
        assert_eq!(config.shell.cities, vec!["Pune", "Delhi"]);
        assert_eq!(config.weather.timeout_seconds, 30);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn test_config_path_generation() {
        if let Some(path) = TempcastConfig::get_config_path() {
            assert!(path.to_string_lossy().contains("tempcast"));
            assert!(path.to_string_lossy().contains("config.toml"));
        }
    }
}
