//! OpenWeatherMap client.
//!
//! Reads current conditions for a configured city. Temperature comes from
//! `main.temp` (metric units, rounded) and humidity from `main.humidity`.
//!
//! # API Reference
//!
//! See: <https://openweathermap.org/current>

use async_trait::async_trait;
use serde::Deserialize;

use super::{SourceAdapter, get_json, into_source_result, round_half_up};
use crate::config::WeatherConfig;
use crate::error::SourceError;
use crate::model::{DataSourceKind, DeviceStatus, SensorReading, SourceResult};

/// Client for the OpenWeatherMap current weather endpoint.
#[derive(Clone)]
pub struct WeatherClient {
    client: reqwest::Client,
    base_url: String,
    city: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(client: reqwest::Client, config: &WeatherConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            city: config.city.clone(),
            api_key: config.api_key.clone(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/data/2.5/weather?q={}&appid={}&units=metric",
            self.base_url,
            urlencoding::encode(&self.city),
            urlencoding::encode(&self.api_key)
        )
    }

    /// Fetch and normalize the current weather.
    pub async fn fetch_reading(&self) -> Result<SensorReading, SourceError> {
        let response: WeatherResponse = get_json(self.client.get(self.url())).await?;
        response.into_reading()
    }
}

#[async_trait]
impl SourceAdapter for WeatherClient {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Weather
    }

    async fn attempt(&self) -> SourceResult {
        into_source_result(self.kind(), self.fetch_reading().await)
    }
}

// ============================================================================
// Response types
// ============================================================================

/// The subset of the current weather response we read.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    #[serde(default)]
    pub main: Option<WeatherMain>,
}

/// The `main` block: temperature and humidity.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMain {
    /// Temperature in degrees Celsius (with `units=metric`).
    #[serde(default)]
    pub temp: Option<f64>,

    /// Relative humidity in percent.
    #[serde(default)]
    pub humidity: Option<f64>,
}

impl WeatherResponse {
    pub fn into_reading(self) -> Result<SensorReading, SourceError> {
        let main = self
            .main
            .ok_or_else(|| SourceError::malformed("weather response has no `main` block"))?;
        let temp = main
            .temp
            .ok_or_else(|| SourceError::malformed("weather response has no `main.temp`"))?;
        let humidity = main
            .humidity
            .ok_or_else(|| SourceError::malformed("weather response has no `main.humidity`"))?;

        Ok(SensorReading::new(
            round_half_up(temp),
            round_half_up(humidity),
            DeviceStatus::Online,
        ))
    }
}
