//! Fixed-priority fallback chain over the data sources.
//!
//! Adapters are tried strictly one after another, in priority order, and
//! the first success wins. Nothing is retried within one acquisition; the
//! terminal simulated source guarantees a reading unless its own fallback is
//! misconfigured.

use tracing::{info, warn};

use crate::config::DashboardConfig;
use crate::data_sources::{
    AirQualityClient, SatelliteClient, SimulatedSource, SourceAdapter, TerminalSource,
    WeatherClient,
};
use crate::error::ConfigurationError;
use crate::model::{DataSourceKind, SensorReading, SourceResult};

/// Ordered adapters followed by one terminal source.
pub struct FallbackChain {
    adapters: Vec<Box<dyn SourceAdapter>>,
    terminal: Box<dyn TerminalSource>,
}

impl FallbackChain {
    pub fn new(adapters: Vec<Box<dyn SourceAdapter>>, terminal: Box<dyn TerminalSource>) -> Self {
        Self { adapters, terminal }
    }

    /// The standard chain: Weather, AirQuality, Satellite, then Simulated.
    pub fn from_config(config: &DashboardConfig, client: reqwest::Client) -> Self {
        let adapters: Vec<Box<dyn SourceAdapter>> = vec![
            Box::new(WeatherClient::new(client.clone(), &config.weather)),
            Box::new(AirQualityClient::new(client.clone(), &config.air_quality)),
            Box::new(SatelliteClient::new(client.clone(), &config.satellite)),
        ];
        Self::new(
            adapters,
            Box::new(SimulatedSource::new(client, &config.simulated)),
        )
    }

    /// Source kinds in the order they are tried.
    pub fn order(&self) -> Vec<DataSourceKind> {
        self.adapters
            .iter()
            .map(|adapter| adapter.kind())
            .chain(std::iter::once(self.terminal.kind()))
            .collect()
    }

    /// Acquire one reading, along with the source that produced it.
    pub async fn acquire_reading(
        &self,
    ) -> Result<(SensorReading, DataSourceKind), ConfigurationError> {
        for adapter in &self.adapters {
            match adapter.attempt().await {
                SourceResult::Success(reading) => {
                    info!(source = adapter.kind().label(), ?reading, "Reading acquired");
                    return Ok((reading, adapter.kind()));
                }
                SourceResult::Unavailable => continue,
            }
        }

        let kind = self.terminal.kind();
        match self.terminal.acquire().await {
            Ok(reading) => {
                info!(source = kind.label(), ?reading, "Reading acquired");
                Ok((reading, kind))
            }
            Err(e) => {
                warn!(source = kind.label(), error = %e, "Terminal source failed");
                Err(e)
            }
        }
    }
}
