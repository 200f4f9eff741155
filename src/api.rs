//! HTTP API handlers for sensordash.
//!
//! The API exposes what the controller last rendered so a front end can draw
//! the widgets and chart, plus the manual refresh trigger.
//!
//! - `GET /health` - Health check
//! - `GET /dashboard` - Full dashboard snapshot
//! - `GET /series` - Chart series only
//! - `POST /refresh` - Manual refresh

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing::{info, instrument};

use crate::dashboard::{
    DashboardController, DashboardSnapshot, RefreshOutcome, RefreshTrigger, SnapshotRenderer,
};
use crate::model::SeriesPoint;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<DashboardController>,
    pub snapshot: SnapshotRenderer,
}

/// Build the router with all routes and request tracing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/dashboard", get(get_dashboard))
        .route("/series", get(get_series))
        .route("/refresh", post(post_refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint.
pub async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// GET /dashboard - The most recently rendered dashboard.
///
/// # Response
///
/// ```json
/// {
///     "api_status": "live",
///     "api_status_text": "Live Data",
///     "loading": false,
///     "reading": {
///         "reading": { "temperature": 24, "humidity": 51, "status": "Online" },
///         "temperature_severity": "Normal",
///         "humidity_severity": "Normal",
///         "source": "weather",
///         "is_live": true,
///         "updated_at": "2024-01-15T10:30:00+00:00"
///     },
///     "alerts": [{ "message": "No active alerts", "level": "info" }],
///     "series": [{ "label": "10:30:00", "value": 24 }],
///     "tags": { "api_status": "live", "temperature": "Normal", "humidity": "Normal", "device_status": "" }
/// }
/// ```
#[instrument(skip(state))]
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.snapshot.snapshot().await)
}

/// GET /series - Ordered chart points, oldest first.
#[instrument(skip(state))]
pub async fn get_series(State(state): State<AppState>) -> Json<Vec<SeriesPoint>> {
    Json(state.controller.series().await)
}

/// POST /refresh - Request an immediate refresh.
///
/// Waits for the cycle to finish. If a refresh is already running the
/// request is ignored and the response reports `"skipped"`.
///
/// # Response
///
/// ```json
/// { "outcome": "completed", "source": "air_quality" }
/// ```
#[instrument(skip(state))]
pub async fn post_refresh(State(state): State<AppState>) -> Json<RefreshOutcome> {
    let outcome = state.controller.refresh(RefreshTrigger::Manual).await;
    info!(?outcome, "Manual refresh handled");
    Json(outcome)
}
