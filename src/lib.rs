//! Sensordash - a live environmental sensor dashboard.
//!
//! # Overview
//!
//! Sensordash polls temperature, humidity, and device status from a
//! prioritized chain of data sources, classifies each reading against
//! configured thresholds, keeps a bounded rolling temperature series, and
//! raises threshold-based alerts on a fixed refresh cadence.
//!
//! # Data Flow
//!
//! timer or manual trigger → [`dashboard::DashboardController`] →
//! [`chain::FallbackChain`] → first successful source → classification,
//! alerts, and series update → [`dashboard::Renderer`].
//!
//! # Modules
//!
//! - [`model`]: Readings, severities, alerts, and series points
//! - [`data_sources`]: Provider adapters and the terminal simulated source
//! - [`chain`]: Fixed-priority fallback over the adapters
//! - [`alerts`]: Alert derivation
//! - [`series`]: Bounded rolling series
//! - [`dashboard`]: Refresh controller and rendering seam
//! - [`config`]: Runtime configuration
//! - [`api`]: HTTP API handlers

pub mod alerts;
pub mod api;
pub mod chain;
pub mod config;
pub mod dashboard;
pub mod data_sources;
pub mod error;
pub mod model;
pub mod series;
