//! Alert derivation for sensor readings.
//!
//! Alerts are rebuilt in full from each reading; nothing is carried over
//! between refreshes.

use crate::model::{Alert, DeviceStatus, SensorReading, Severity, ThresholdPair};

/// Derive the ordered alert list for a reading.
///
/// Evaluation order is fixed: temperature, then humidity, then device
/// status. Each metric contributes at most one alert. When nothing
/// triggers, the result is a single "no active alerts" placeholder rather
/// than an empty list.
pub fn derive_alerts(
    reading: &SensorReading,
    temperature_thresholds: &ThresholdPair,
    humidity_thresholds: &ThresholdPair,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    match Severity::classify(reading.temperature as f64, temperature_thresholds) {
        Severity::High => alerts.push(Alert::danger(format!(
            "High temperature detected: {}°C",
            reading.temperature
        ))),
        Severity::Low => alerts.push(Alert::warning(format!(
            "Low temperature detected: {}°C",
            reading.temperature
        ))),
        Severity::Normal => {}
    }

    match Severity::classify(reading.humidity as f64, humidity_thresholds) {
        Severity::High => alerts.push(Alert::warning(format!(
            "High humidity detected: {}%",
            reading.humidity
        ))),
        Severity::Low => alerts.push(Alert::warning(format!(
            "Low humidity detected: {}%",
            reading.humidity
        ))),
        Severity::Normal => {}
    }

    if let Some(alert) = status_alert(reading.status) {
        alerts.push(alert);
    }

    if alerts.is_empty() {
        alerts.push(Alert::no_active_alerts());
    }

    alerts
}

fn status_alert(status: DeviceStatus) -> Option<Alert> {
    match status {
        DeviceStatus::Offline => Some(Alert::danger("Device is offline")),
        DeviceStatus::Maintenance => Some(Alert::warning("Device is in maintenance mode")),
        DeviceStatus::Online => None,
    }
}
