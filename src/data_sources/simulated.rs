//! Simulated sensor source.
//!
//! Loads a base reading from a static JSON document and perturbs it:
//! temperature gains `[0, 5)` degrees and humidity gains `[0, 10)` percent.
//! When the document cannot be loaded the configured fallback base is used
//! instead, so this source only fails if the fallback itself is unusable:
//! a base is rejected whenever its largest possible perturbation would
//! overflow, regardless of the actual draw.
//!
//! The document is always loaded fresh. Files are re-read from disk and
//! URLs get a `t=<epoch millis>` cache-busting query parameter.

use std::ops::Range;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use rand::Rng;
use serde::Deserialize;
use tracing::warn;

use super::{TerminalSource, get_json};
use crate::config::SimulatedConfig;
use crate::error::{ConfigurationError, SourceError};
use crate::model::{DataSourceKind, DeviceStatus, SensorReading};

/// Where the base reading document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulatedResource {
    File(PathBuf),
    Url(String),
}

impl SimulatedResource {
    /// Interpret a configured location: http(s) URLs are fetched, anything
    /// else is a file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            SimulatedResource::Url(location.to_string())
        } else {
            SimulatedResource::File(PathBuf::from(location))
        }
    }
}

/// Shape of the base reading document.
#[derive(Debug, Clone, Deserialize)]
pub struct BaseReading {
    pub temperature: i64,
    pub humidity: i64,
    #[serde(default)]
    pub status: Option<String>,
}

impl BaseReading {
    /// Convert to a reading. A missing or empty status means `Online`.
    pub fn into_reading(self) -> Result<SensorReading, SourceError> {
        let status = match self.status.as_deref() {
            None | Some("") => DeviceStatus::Online,
            Some("Online") => DeviceStatus::Online,
            Some("Offline") => DeviceStatus::Offline,
            Some("Maintenance") => DeviceStatus::Maintenance,
            Some(other) => {
                return Err(SourceError::malformed(format!(
                    "unknown device status {other:?}"
                )));
            }
        };
        Ok(SensorReading::new(self.temperature, self.humidity, status))
    }
}

/// Degrees added to the base temperature.
pub const TEMPERATURE_JITTER: Range<i64> = 0..5;

/// Percent added to the base humidity.
pub const HUMIDITY_JITTER: Range<i64> = 0..10;

/// Apply the random perturbation to a base reading.
///
/// Returns `None` if the largest possible perturbation would overflow.
pub fn randomize<R: Rng + ?Sized>(base: &SensorReading, rng: &mut R) -> Option<SensorReading> {
    base.temperature.checked_add(TEMPERATURE_JITTER.end - 1)?;
    base.humidity.checked_add(HUMIDITY_JITTER.end - 1)?;

    Some(SensorReading::new(
        base.temperature + rng.gen_range(TEMPERATURE_JITTER),
        base.humidity + rng.gen_range(HUMIDITY_JITTER),
        base.status,
    ))
}

/// The terminal link of the fallback chain.
#[derive(Clone)]
pub struct SimulatedSource {
    client: reqwest::Client,
    resource: SimulatedResource,
    fallback: SensorReading,
}

impl SimulatedSource {
    pub fn new(client: reqwest::Client, config: &SimulatedConfig) -> Self {
        Self {
            client,
            resource: SimulatedResource::parse(&config.resource),
            fallback: config.fallback,
        }
    }

    pub fn resource(&self) -> &SimulatedResource {
        &self.resource
    }

    /// Load the base reading document.
    pub async fn load_base(&self) -> Result<SensorReading, SourceError> {
        let base: BaseReading = match &self.resource {
            SimulatedResource::File(path) => {
                let bytes = tokio::fs::read(path).await?;
                serde_json::from_slice(&bytes)?
            }
            SimulatedResource::Url(url) => {
                let request = self
                    .client
                    .get(url)
                    .query(&[("t", Utc::now().timestamp_millis())]);
                get_json(request).await?
            }
        };
        base.into_reading()
    }
}

#[async_trait]
impl TerminalSource for SimulatedSource {
    fn kind(&self) -> DataSourceKind {
        DataSourceKind::Simulated
    }

    async fn acquire(&self) -> Result<SensorReading, ConfigurationError> {
        let loaded = self.load_base().await;
        let mut rng = rand::thread_rng();

        match loaded {
            Ok(base) => match randomize(&base, &mut rng) {
                Some(reading) => return Ok(reading),
                None => warn!(?base, "Simulated base reading overflows, using fallback"),
            },
            Err(e) => warn!(
                resource = ?self.resource,
                error = %e,
                "Failed to load simulated base reading, using fallback"
            ),
        }

        randomize(&self.fallback, &mut rng).ok_or_else(|| {
            ConfigurationError(format!(
                "simulated fallback reading {:?} cannot be perturbed",
                self.fallback
            ))
        })
    }
}
