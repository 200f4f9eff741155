//! Data models for sensordash.
//!
//! Every refresh produces a fresh [`SensorReading`]; nothing here is
//! persisted across refreshes. Severities and alerts are always derived from
//! the reading they describe and are never stored on their own.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Operational state reported for the monitored device.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeviceStatus {
    #[default]
    Online,
    Offline,
    Maintenance,
}

impl DeviceStatus {
    /// Badge style tag for the device-status widget.
    ///
    /// `Online` uses the default badge styling, so its tag is empty.
    pub fn badge_class(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Maintenance => "maintenance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DeviceStatus::Online => "Online",
            DeviceStatus::Offline => "Offline",
            DeviceStatus::Maintenance => "Maintenance",
        }
    }
}

/// A canonical (temperature, humidity, status) triple at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Temperature in whole degrees Celsius.
    pub temperature: i64,

    /// Relative humidity in whole percent.
    pub humidity: i64,

    pub status: DeviceStatus,
}

impl SensorReading {
    pub fn new(temperature: i64, humidity: i64, status: DeviceStatus) -> Self {
        Self {
            temperature,
            humidity,
            status,
        }
    }
}

/// Which adapter produced the active reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSourceKind {
    /// OpenWeatherMap current weather.
    Weather,
    /// World Air Quality Index feed.
    AirQuality,
    /// NASA Astronomy Picture of the Day, used only to extend fallback depth.
    Satellite,
    /// Local base reading with random perturbation.
    Simulated,
}

impl DataSourceKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            DataSourceKind::Weather => "OpenWeatherMap",
            DataSourceKind::AirQuality => "WAQI",
            DataSourceKind::Satellite => "NASA APOD",
            DataSourceKind::Simulated => "Simulated",
        }
    }

    /// Whether readings from this source come from a live external API.
    pub fn is_live(&self) -> bool {
        !matches!(self, DataSourceKind::Simulated)
    }
}

/// Outcome of a single adapter attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResult {
    Success(SensorReading),
    Unavailable,
}

/// Inclusive low/high range for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub low: f64,
    pub high: f64,
}

impl ThresholdPair {
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }
}

/// Tri-state classification of a value against a [`ThresholdPair`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Normal,
    High,
}

impl Severity {
    /// Classify a value against its thresholds.
    ///
    /// # Thresholds
    ///
    /// - `Low`: value < low
    /// - `High`: value > high
    /// - `Normal`: low <= value <= high (both boundaries are normal)
    pub fn classify(value: f64, thresholds: &ThresholdPair) -> Self {
        if value < thresholds.low {
            Severity::Low
        } else if value > thresholds.high {
            Severity::High
        } else {
            Severity::Normal
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Normal => "Normal",
            Severity::High => "High",
        }
    }
}

/// How loudly an alert should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    /// Only used by the "no active alerts" placeholder.
    Info,
    Warning,
    Danger,
}

/// A single dashboard alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub message: String,
    pub level: AlertLevel,
}

/// Message shown when no condition triggers.
pub const NO_ACTIVE_ALERTS: &str = "No active alerts";

/// Message shown when the fallback chain cannot produce any reading.
pub const FETCH_FAILED_MESSAGE: &str =
    "Failed to fetch sensor data. Please check your connection.";

impl Alert {
    pub fn new(message: impl Into<String>, level: AlertLevel) -> Self {
        Self {
            message: message.into(),
            level,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(message, AlertLevel::Warning)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(message, AlertLevel::Danger)
    }

    /// The informational placeholder reported when nothing is wrong.
    pub fn no_active_alerts() -> Self {
        Self::new(NO_ACTIVE_ALERTS, AlertLevel::Info)
    }

    pub fn fetch_failed() -> Self {
        Self::danger(FETCH_FAILED_MESSAGE)
    }

    pub fn is_placeholder(&self) -> bool {
        self.level == AlertLevel::Info
    }
}

/// One point on the temperature chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Display-formatted timestamp.
    pub label: String,

    /// Temperature in degrees Celsius.
    pub value: i64,
}

impl SeriesPoint {
    pub fn new(label: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// State of the API-status indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiStatus {
    Connecting,
    Live,
    Simulated,
    Error,
}

impl ApiStatus {
    /// Status for a successful refresh from the given source.
    pub fn for_source(source: DataSourceKind) -> Self {
        if source.is_live() {
            ApiStatus::Live
        } else {
            ApiStatus::Simulated
        }
    }

    /// Style tag for the indicator.
    pub fn class(&self) -> &'static str {
        match self {
            ApiStatus::Connecting => "connecting",
            ApiStatus::Live => "live",
            ApiStatus::Simulated => "simulated",
            ApiStatus::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ApiStatus::Connecting => "Connecting...",
            ApiStatus::Live => "Live Data",
            ApiStatus::Simulated => "Simulated Data",
            ApiStatus::Error => "Connection Error",
        }
    }
}

/// Everything the value widgets need after a successful refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingPanel {
    pub reading: SensorReading,
    pub temperature_severity: Severity,
    pub humidity_severity: Severity,
    pub source: DataSourceKind,
    pub is_live: bool,
    pub updated_at: DateTime<Local>,
}
