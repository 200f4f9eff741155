//! External data sources for sensor readings.
//!
//! Each adapter calls one provider and normalizes whatever it returns into a
//! [`SensorReading`]. Adapters never surface transport or parsing failures to
//! their caller; a failed attempt is simply [`SourceResult::Unavailable`].
//!
//! # Data Sources
//!
//! - [`weather`]: OpenWeatherMap current conditions
//! - [`air_quality`]: World Air Quality Index feed
//! - [`satellite`]: NASA APOD, kept only to deepen the fallback chain
//! - [`simulated`]: local base reading with random perturbation (terminal)

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::{ConfigurationError, SourceError};
use crate::model::{DataSourceKind, SensorReading, SourceResult};

pub mod air_quality;
pub mod satellite;
pub mod simulated;
pub mod weather;

pub use air_quality::AirQualityClient;
pub use satellite::SatelliteClient;
pub use simulated::SimulatedSource;
pub use weather::WeatherClient;

/// A provider that may or may not produce a reading on a given attempt.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    /// Make exactly one request to the provider.
    async fn attempt(&self) -> SourceResult;
}

/// The last link of the fallback chain.
///
/// A terminal source always produces a reading unless its own hardcoded
/// fallback cannot be constructed, which is a configuration problem.
#[async_trait]
pub trait TerminalSource: Send + Sync {
    fn kind(&self) -> DataSourceKind;

    async fn acquire(&self) -> Result<SensorReading, ConfigurationError>;
}

/// Build the HTTP client shared by all adapters.
///
/// Every request is bounded by `timeout`; expiry surfaces as a transport error.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("sensordash/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Send a request and decode its JSON body.
///
/// Non-success statuses are transport errors; undecodable bodies are
/// malformed responses.
pub(crate) async fn get_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, SourceError> {
    let response = request
        .header(reqwest::header::CACHE_CONTROL, "no-cache")
        .send()
        .await?
        .error_for_status()?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}

/// Collapse an adapter's internal result into a [`SourceResult`].
pub(crate) fn into_source_result(
    kind: DataSourceKind,
    result: Result<SensorReading, SourceError>,
) -> SourceResult {
    match result {
        Ok(reading) => {
            debug!(source = kind.label(), ?reading, "Source produced a reading");
            SourceResult::Success(reading)
        }
        Err(e) => {
            warn!(source = kind.label(), error = %e, "Source unavailable");
            SourceResult::Unavailable
        }
    }
}

/// Round half-way cases toward positive infinity, so `-2.5` becomes `-2`.
pub(crate) fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
