//! Runtime configuration.
//!
//! Configuration is static and loaded once at startup: built-in defaults,
//! optionally replaced by a TOML file, then a few environment overrides.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::model::{DeviceStatus, SensorReading, ThresholdPair};
use crate::series::DEFAULT_MAX_POINTS;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "SENSORDASH_CONFIG";

/// Config file used when `SENSORDASH_CONFIG` is unset. Optional.
pub const DEFAULT_CONFIG_PATH: &str = "sensordash.toml";

/// Dashboard configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Milliseconds between timer-driven refreshes.
    pub refresh_interval_ms: u64,

    /// Maximum number of points kept on the chart.
    pub max_series_points: usize,

    /// Per-request timeout for adapter HTTP calls, in seconds.
    pub request_timeout_secs: u64,

    /// `chrono` format string for chart labels.
    pub series_label_format: String,

    pub temperature_thresholds: ThresholdPair,
    pub humidity_thresholds: ThresholdPair,

    pub weather: WeatherConfig,
    pub air_quality: AirQualityConfig,
    pub satellite: SatelliteConfig,
    pub simulated: SimulatedConfig,
    pub server: ServerConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            refresh_interval_ms: 5000,
            max_series_points: DEFAULT_MAX_POINTS,
            request_timeout_secs: 10,
            series_label_format: "%H:%M:%S".to_string(),
            temperature_thresholds: ThresholdPair::new(20.0, 30.0),
            humidity_thresholds: ThresholdPair::new(30.0, 60.0),
            weather: WeatherConfig::default(),
            air_quality: AirQualityConfig::default(),
            satellite: SatelliteConfig::default(),
            simulated: SimulatedConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

/// OpenWeatherMap settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub city: String,
    pub api_key: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openweathermap.org".to_string(),
            city: "London".to_string(),
            api_key: "demo".to_string(),
        }
    }
}

/// World Air Quality Index settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AirQualityConfig {
    pub base_url: String,
    pub city: String,
    pub token: String,
}

impl Default for AirQualityConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.waqi.info".to_string(),
            city: "london".to_string(),
            token: "demo".to_string(),
        }
    }
}

/// NASA APOD settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SatelliteConfig {
    pub url: String,
    pub api_key: String,
}

impl Default for SatelliteConfig {
    fn default() -> Self {
        Self {
            url: "https://api.nasa.gov/planetary/apod".to_string(),
            api_key: "DEMO_KEY".to_string(),
        }
    }
}

/// Simulated source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulatedConfig {
    /// File path or http(s) URL of the base reading JSON document.
    pub resource: String,

    /// Base reading used when the resource cannot be loaded.
    pub fallback: SensorReading,
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            resource: "data.json".to_string(),
            fallback: SensorReading::new(27, 45, DeviceStatus::Online),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl DashboardConfig {
    /// Load configuration for the running process.
    ///
    /// An explicitly named config file must exist; the default path is
    /// optional and silently skipped when absent.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) => {
                let path = PathBuf::from(DEFAULT_CONFIG_PATH);
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML config file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(port) = env::var("SENSORDASH_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
        {
            self.server.port = port;
        }

        if let Ok(key) = env::var("SENSORDASH_WEATHER_API_KEY") {
            self.weather.api_key = key;
        }

        if let Ok(city) = env::var("SENSORDASH_WEATHER_CITY") {
            self.weather.city = city;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refresh_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "refresh_interval_ms must be greater than zero".to_string(),
            ));
        }

        if self.max_series_points == 0 {
            return Err(ConfigError::Invalid(
                "max_series_points must be at least 1".to_string(),
            ));
        }

        if StrftimeItems::new(&self.series_label_format).any(|item| matches!(item, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "series_label_format {:?} is not a valid time format",
                self.series_label_format
            )));
        }

        for (name, pair) in [
            ("temperature_thresholds", &self.temperature_thresholds),
            ("humidity_thresholds", &self.humidity_thresholds),
        ] {
            if !(pair.low <= pair.high) {
                return Err(ConfigError::Invalid(format!(
                    "{name}: low ({}) must not exceed high ({})",
                    pair.low, pair.high
                )));
            }
        }

        Ok(())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
