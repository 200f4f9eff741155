//! NASA APOD client.
//!
//! This source exists only to extend the depth of the fallback chain. APOD
//! carries no environmental data; the reading is derived from the length of
//! the picture's `url` field:
//!
//! - temperature = `22 + (len % 8)`
//! - humidity = `40 + (len % 20)`
//!
//! The values are deterministic for a given payload but physically
//! meaningless. `len` counts UTF-16 code units, and a payload without a `url`
//! field counts as length zero.
//!
//! # API Reference
//!
//! See: <https://api.nasa.gov/>

use async_trait::async_trait;
use serde_json::Value;

use super::{SourceAdapter, get_json, into_source_result};
use crate::config::SatelliteConfig;
use crate::error::SourceError;
use crate::model::{DataSourceKind, DeviceStatus, SensorReading, SourceResult};

/// Client for the Astronomy Picture of the Day endpoint.
#[derive(Clone)]
pub struct SatelliteClient {
    client: reqwest::Client,
    url: String,
    api_key: String,
}

impl SatelliteClient {
    pub fn new(client: reqwest::Client, config: &SatelliteConfig) -> Self {
        Self {
            client,
            url: config.url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    pub async fn fetch_reading(&self) -> Result<SensorReading, SourceError> {
        let request = self
            .client
            .get(&self.url)
            .query(&[("api_key", self.api_key.as_str())]);
        let payload: Value = get_json(request).await?;
        reading_from_payload(&payload)
    }
}

#[async_trait]
impl SourceAdapter for SatelliteClient {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Satellite
    }

    async fn attempt(&self) -> SourceResult {
        into_source_result(self.kind(), self.fetch_reading().await)
    }
}

/// Derive a reading from an APOD payload.
pub fn reading_from_payload(payload: &Value) -> Result<SensorReading, SourceError> {
    let object = payload
        .as_object()
        .ok_or_else(|| SourceError::malformed("APOD payload is not a JSON object"))?;

    let len = object
        .get("url")
        .and_then(Value::as_str)
        .map(|url| url.encode_utf16().count())
        .unwrap_or(0) as i64;

    Ok(SensorReading::new(
        22 + len % 8,
        40 + len % 20,
        DeviceStatus::Online,
    ))
}
