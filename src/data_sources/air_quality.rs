//! World Air Quality Index (WAQI) client.
//!
//! WAQI does not report temperature directly, so a temperature-like value is
//! synthesized from the air-quality index as `round(20 + aqi / 10)`.
//! Humidity comes from the embedded `iaqi.h.v` reading when the station
//! reports one, otherwise a value in `[45, 55)` is made up.
//!
//! # API Reference
//!
//! See: <https://aqicn.org/json-api/doc/>

use async_trait::async_trait;
use rand::Rng;
use serde::Deserialize;
use serde_json::Value;

use super::{SourceAdapter, get_json, into_source_result, round_half_up};
use crate::config::AirQualityConfig;
use crate::error::SourceError;
use crate::model::{DataSourceKind, DeviceStatus, SensorReading, SourceResult};

/// Client for the WAQI city feed.
#[derive(Clone)]
pub struct AirQualityClient {
    client: reqwest::Client,
    base_url: String,
    city: String,
    token: String,
}

impl AirQualityClient {
    pub fn new(client: reqwest::Client, config: &AirQualityConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            city: config.city.clone(),
            token: config.token.clone(),
        }
    }

    fn url(&self) -> String {
        format!(
            "{}/feed/{}/?token={}",
            self.base_url,
            urlencoding::encode(&self.city),
            urlencoding::encode(&self.token)
        )
    }

    /// Fetch the city feed and normalize it.
    pub async fn fetch_reading(&self) -> Result<SensorReading, SourceError> {
        let response: AirQualityResponse = get_json(self.client.get(self.url())).await?;
        response.into_reading(&mut rand::thread_rng())
    }
}

#[async_trait]
impl SourceAdapter for AirQualityClient {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::AirQuality
    }

    async fn attempt(&self) -> SourceResult {
        into_source_result(self.kind(), self.fetch_reading().await)
    }
}

// ============================================================================
// Response types
// ============================================================================

/// Response from the WAQI feed endpoint.
///
/// `data` is an object on success but a plain error string otherwise, so it
/// is kept as raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct AirQualityResponse {
    #[serde(default)]
    pub status: String,

    #[serde(default)]
    pub data: Value,
}

impl AirQualityResponse {
    /// The numeric air-quality index, if the station reports one.
    ///
    /// Stations without a current measurement report `"-"`.
    pub fn aqi(&self) -> Option<f64> {
        self.data.get("aqi").and_then(Value::as_f64)
    }

    /// The embedded humidity sub-reading.
    pub fn humidity(&self) -> Option<f64> {
        self.data.pointer("/iaqi/h/v").and_then(Value::as_f64)
    }

    pub fn into_reading<R: Rng + ?Sized>(self, rng: &mut R) -> Result<SensorReading, SourceError> {
        if self.status != "ok" {
            return Err(SourceError::malformed(format!(
                "air quality status is {:?}",
                self.status
            )));
        }

        let aqi = self
            .aqi()
            .ok_or_else(|| SourceError::malformed("air quality response has no numeric aqi"))?;

        let humidity = match self.humidity() {
            Some(h) => round_half_up(h),
            None => rng.gen_range(45..55),
        };

        Ok(SensorReading::new(
            round_half_up(20.0 + aqi / 10.0),
            humidity,
            DeviceStatus::Online,
        ))
    }
}
