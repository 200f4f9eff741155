//! Dashboard controller and rendering seam.
//!
//! The [`DashboardController`] owns all mutable dashboard state and drives
//! refresh cycles. Both the repeating timer and manual refresh requests go
//! through [`DashboardController::refresh`], which refuses to start a cycle
//! while another one is in flight. Stopping the timer never interrupts a
//! cycle: the timer task only checks for a stop request between cycles.
//!
//! # Usage
//!
//! ```ignore
//! let renderer = SnapshotRenderer::new();
//! let controller = Arc::new(DashboardController::new(chain, Arc::new(renderer.clone()), &config));
//! controller.start().await;
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Local;
use serde::Serialize;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::alerts::derive_alerts;
use crate::chain::FallbackChain;
use crate::config::DashboardConfig;
use crate::model::{
    Alert, ApiStatus, DataSourceKind, ReadingPanel, SensorReading, SeriesPoint, Severity,
    ThresholdPair,
};
use crate::series::SeriesBuffer;

// ============================================================================
// Rendering
// ============================================================================

/// Presentation collaborator fed by the controller.
///
/// A successful refresh publishes its reading, alerts, series and status
/// through one [`Renderer::render_refresh`] call. A failed refresh goes
/// through [`Renderer::render_failure`] and only changes the API status and
/// the alert list.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn set_api_status(&self, status: ApiStatus);

    async fn set_loading(&self, loading: bool);

    async fn render_reading(&self, panel: &ReadingPanel);

    async fn render_alerts(&self, alerts: &[Alert]);

    /// Redraw the chart in place from the full series.
    async fn render_series(&self, points: &[SeriesPoint]);

    /// Publish everything one successful refresh produced.
    ///
    /// Renderers read concurrently should override this to apply the whole
    /// update at once.
    async fn render_refresh(
        &self,
        panel: &ReadingPanel,
        alerts: &[Alert],
        points: &[SeriesPoint],
        status: ApiStatus,
    ) {
        self.render_reading(panel).await;
        self.render_alerts(alerts).await;
        self.render_series(points).await;
        self.set_api_status(status).await;
    }

    /// Publish a failed refresh: error status and its alerts.
    async fn render_failure(&self, alerts: &[Alert]) {
        self.set_api_status(ApiStatus::Error).await;
        self.render_alerts(alerts).await;
    }
}

/// Style tags for each widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StateTags {
    pub api_status: &'static str,
    pub temperature: &'static str,
    pub humidity: &'static str,
    pub device_status: &'static str,
}

/// The last rendered dashboard, as served to front ends.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub api_status: ApiStatus,
    pub api_status_text: &'static str,
    pub loading: bool,
    pub reading: Option<ReadingPanel>,
    pub alerts: Vec<Alert>,
    pub series: Vec<SeriesPoint>,
    pub tags: StateTags,
}

impl Default for DashboardSnapshot {
    fn default() -> Self {
        Self {
            api_status: ApiStatus::Connecting,
            api_status_text: ApiStatus::Connecting.label(),
            loading: false,
            reading: None,
            alerts: Vec::new(),
            series: Vec::new(),
            tags: StateTags {
                api_status: ApiStatus::Connecting.class(),
                ..StateTags::default()
            },
        }
    }
}

impl DashboardSnapshot {
    fn apply_status(&mut self, status: ApiStatus) {
        self.api_status = status;
        self.api_status_text = status.label();
        self.tags.api_status = status.class();
    }

    fn apply_reading(&mut self, panel: &ReadingPanel) {
        self.tags.temperature = panel.temperature_severity.label();
        self.tags.humidity = panel.humidity_severity.label();
        self.tags.device_status = panel.reading.status.badge_class();
        self.reading = Some(panel.clone());
    }
}

/// In-memory renderer keeping the latest [`DashboardSnapshot`].
///
/// Every update happens under one write lock, so readers never observe a
/// reading next to another refresh's alerts or series.
#[derive(Clone, Default)]
pub struct SnapshotRenderer {
    snapshot: Arc<RwLock<DashboardSnapshot>>,
}

impl SnapshotRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> DashboardSnapshot {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl Renderer for SnapshotRenderer {
    async fn set_api_status(&self, status: ApiStatus) {
        self.snapshot.write().await.apply_status(status);
    }

    async fn set_loading(&self, loading: bool) {
        self.snapshot.write().await.loading = loading;
    }

    async fn render_reading(&self, panel: &ReadingPanel) {
        self.snapshot.write().await.apply_reading(panel);
    }

    async fn render_alerts(&self, alerts: &[Alert]) {
        self.snapshot.write().await.alerts = alerts.to_vec();
    }

    async fn render_series(&self, points: &[SeriesPoint]) {
        self.snapshot.write().await.series = points.to_vec();
    }

    async fn render_refresh(
        &self,
        panel: &ReadingPanel,
        alerts: &[Alert],
        points: &[SeriesPoint],
        status: ApiStatus,
    ) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.apply_reading(panel);
        snapshot.alerts = alerts.to_vec();
        snapshot.series = points.to_vec();
        snapshot.apply_status(status);
    }

    async fn render_failure(&self, alerts: &[Alert]) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.apply_status(ApiStatus::Error);
        snapshot.alerts = alerts.to_vec();
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Process-wide dashboard state, owned by the controller.
#[derive(Debug)]
pub struct DashboardState {
    pub active_source: DataSourceKind,
    pub is_live: bool,
    pub series: SeriesBuffer,
    pub refresh_timer: Option<RefreshTimer>,
}

impl DashboardState {
    pub fn new(max_series_points: usize) -> Self {
        Self {
            active_source: DataSourceKind::Simulated,
            is_live: false,
            series: SeriesBuffer::new(max_series_points),
            refresh_timer: None,
        }
    }
}

/// Handle to the background task driving timer refreshes.
#[derive(Debug)]
pub struct RefreshTimer {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl RefreshTimer {
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Ask the timer to stop and wait for it. A cycle already running
    /// completes first.
    async fn stop(self) {
        self.stop.notify_one();
        if let Err(e) = self.task.await {
            warn!(error = %e, "Refresh timer task ended abnormally");
        }
    }
}

/// Whether a refresh cycle is currently running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControllerPhase {
    Idle,
    Refreshing,
}

/// What started a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Startup,
    Timer,
    Manual,
}

/// How a refresh request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RefreshOutcome {
    /// The dashboard was updated from `source`.
    Completed { source: DataSourceKind },
    /// No source produced a reading; only the status and error alert changed.
    Failed,
    /// Another refresh was already in flight; nothing happened.
    Skipped,
}

/// Holds the refresh flag for the duration of one cycle.
///
/// Dropping the guard returns the controller to idle, even if the cycle's
/// future is cancelled part way through.
struct RefreshGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RefreshGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Orchestrates refresh cycles and owns all dashboard state.
pub struct DashboardController {
    chain: FallbackChain,
    renderer: Arc<dyn Renderer>,
    temperature_thresholds: ThresholdPair,
    humidity_thresholds: ThresholdPair,
    label_format: String,
    refresh_interval: Duration,
    refreshing: AtomicBool,
    state: Mutex<DashboardState>,
}

impl DashboardController {
    pub fn new(
        chain: FallbackChain,
        renderer: Arc<dyn Renderer>,
        config: &DashboardConfig,
    ) -> Self {
        Self {
            chain,
            renderer,
            temperature_thresholds: config.temperature_thresholds,
            humidity_thresholds: config.humidity_thresholds,
            label_format: config.series_label_format.clone(),
            refresh_interval: config.refresh_interval(),
            refreshing: AtomicBool::new(false),
            state: Mutex::new(DashboardState::new(config.max_series_points)),
        }
    }

    pub fn phase(&self) -> ControllerPhase {
        if self.refreshing.load(Ordering::Acquire) {
            ControllerPhase::Refreshing
        } else {
            ControllerPhase::Idle
        }
    }

    pub async fn active_source(&self) -> DataSourceKind {
        self.state.lock().await.active_source
    }

    pub async fn is_live(&self) -> bool {
        self.state.lock().await.is_live
    }

    pub async fn series(&self) -> Vec<SeriesPoint> {
        self.state.lock().await.series.snapshot()
    }

    pub async fn is_timer_running(&self) -> bool {
        self.state
            .lock()
            .await
            .refresh_timer
            .as_ref()
            .is_some_and(RefreshTimer::is_running)
    }

    /// Run one refresh cycle unless one is already in flight.
    pub async fn refresh(&self, trigger: RefreshTrigger) -> RefreshOutcome {
        let Some(_guard) = RefreshGuard::acquire(&self.refreshing) else {
            debug!(?trigger, "Refresh already in progress, ignoring request");
            return RefreshOutcome::Skipped;
        };

        debug!(?trigger, "Refresh started");
        self.renderer.set_loading(true).await;
        self.renderer.set_api_status(ApiStatus::Connecting).await;

        let outcome = match self.chain.acquire_reading().await {
            Ok((reading, source)) => {
                self.apply_reading(reading, source).await;
                RefreshOutcome::Completed { source }
            }
            Err(e) => {
                error!(?trigger, error = %e, "All data sources failed");
                self.renderer.render_failure(&[Alert::fetch_failed()]).await;
                RefreshOutcome::Failed
            }
        };

        self.renderer.set_loading(false).await;
        outcome
    }

    /// Classify a fresh reading, record it, and push it to the renderer.
    async fn apply_reading(&self, reading: SensorReading, source: DataSourceKind) {
        let temperature_severity =
            Severity::classify(reading.temperature as f64, &self.temperature_thresholds);
        let humidity_severity =
            Severity::classify(reading.humidity as f64, &self.humidity_thresholds);
        let alerts = derive_alerts(
            &reading,
            &self.temperature_thresholds,
            &self.humidity_thresholds,
        );

        let updated_at = Local::now();
        let point = SeriesPoint::new(
            updated_at.format(&self.label_format).to_string(),
            reading.temperature,
        );

        let series = {
            let mut state = self.state.lock().await;
            state.active_source = source;
            state.is_live = source.is_live();
            state.series.append(point);
            state.series.snapshot()
        };

        let panel = ReadingPanel {
            reading,
            temperature_severity,
            humidity_severity,
            source,
            is_live: source.is_live(),
            updated_at,
        };

        self.renderer
            .render_refresh(&panel, &alerts, &series, ApiStatus::for_source(source))
            .await;
    }

    /// Run the startup refresh, then refresh on every interval tick.
    ///
    /// Calling `start` again stops the previous timer first.
    pub async fn start(self: &Arc<Self>) {
        let previous = self.state.lock().await.refresh_timer.take();
        if let Some(previous) = previous {
            previous.stop().await;
        }

        let controller = Arc::clone(self);
        let period = self.refresh_interval;
        let stop = Arc::new(Notify::new());
        let stop_requested = Arc::clone(&stop);

        let task = tokio::spawn(async move {
            controller.refresh(RefreshTrigger::Startup).await;

            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = stop_requested.notified() => break,
                    _ = ticker.tick() => {}
                }
                controller.refresh(RefreshTrigger::Timer).await;
            }
            debug!("Refresh timer loop exited");
        });

        self.state.lock().await.refresh_timer = Some(RefreshTimer { stop, task });
        info!(interval_ms = period.as_millis() as u64, "Refresh timer started");
    }

    /// Stop the refresh timer, waiting for a refresh already in flight to
    /// finish.
    pub async fn shutdown(&self) {
        let timer = self.state.lock().await.refresh_timer.take();
        if let Some(timer) = timer {
            timer.stop().await;
            info!("Refresh timer stopped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_sources::{SourceAdapter, TerminalSource};
    use crate::error::ConfigurationError;
    use crate::model::{AlertLevel, DeviceStatus, FETCH_FAILED_MESSAGE, SourceResult};
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Weather adapter that blocks until released.
    struct GatedAdapter {
        reading: SensorReading,
        entered: Arc<Notify>,
        release: Arc<Notify>,
    }

    #[async_trait]
    impl SourceAdapter for GatedAdapter {
        fn kind(&self) -> DataSourceKind {
            DataSourceKind::Weather
        }

        async fn attempt(&self) -> SourceResult {
            self.entered.notify_one();
            self.release.notified().await;
            SourceResult::Success(self.reading)
        }
    }

    struct FixedTerminal {
        result: Result<SensorReading, ConfigurationError>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TerminalSource for FixedTerminal {
        fn kind(&self) -> DataSourceKind {
            DataSourceKind::Simulated
        }

        async fn acquire(&self) -> Result<SensorReading, ConfigurationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone()
        }
    }

    /// Renderer counting completed refresh renders.
    #[derive(Default)]
    struct CountingRenderer {
        inner: SnapshotRenderer,
        readings: AtomicUsize,
    }

    #[async_trait]
    impl Renderer for CountingRenderer {
        async fn set_api_status(&self, status: ApiStatus) {
            self.inner.set_api_status(status).await;
        }

        async fn set_loading(&self, loading: bool) {
            self.inner.set_loading(loading).await;
        }

        async fn render_reading(&self, panel: &ReadingPanel) {
            self.inner.render_reading(panel).await;
        }

        async fn render_alerts(&self, alerts: &[Alert]) {
            self.inner.render_alerts(alerts).await;
        }

        async fn render_series(&self, points: &[SeriesPoint]) {
            self.inner.render_series(points).await;
        }

        async fn render_refresh(
            &self,
            panel: &ReadingPanel,
            alerts: &[Alert],
            points: &[SeriesPoint],
            status: ApiStatus,
        ) {
            self.readings.fetch_add(1, Ordering::SeqCst);
            self.inner.render_refresh(panel, alerts, points, status).await;
        }

        async fn render_failure(&self, alerts: &[Alert]) {
            self.inner.render_failure(alerts).await;
        }
    }

    fn simulated_only(
        result: Result<SensorReading, ConfigurationError>,
        config: &DashboardConfig,
    ) -> (Arc<DashboardController>, Arc<CountingRenderer>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let chain = FallbackChain::new(
            Vec::new(),
            Box::new(FixedTerminal {
                result,
                calls: Arc::clone(&calls),
            }),
        );
        let renderer = Arc::new(CountingRenderer::default());
        let controller = Arc::new(DashboardController::new(
            chain,
            renderer.clone() as Arc<dyn Renderer>,
            config,
        ));
        (controller, renderer, calls)
    }

    #[tokio::test]
    async fn test_initial_state() {
        let (controller, _, _) = simulated_only(
            Ok(SensorReading::new(25, 45, DeviceStatus::Online)),
            &DashboardConfig::default(),
        );

        assert_eq!(controller.phase(), ControllerPhase::Idle);
        assert_eq!(controller.active_source().await, DataSourceKind::Simulated);
        assert!(!controller.is_live().await);
        assert!(controller.series().await.is_empty());
        assert!(!controller.is_timer_running().await);
    }

    #[tokio::test]
    async fn test_successful_refresh_updates_everything() {
        let (controller, renderer, _) = simulated_only(
            Ok(SensorReading::new(35, 65, DeviceStatus::Offline)),
            &DashboardConfig::default(),
        );

        let outcome = controller.refresh(RefreshTrigger::Manual).await;

        assert_eq!(
            outcome,
            RefreshOutcome::Completed {
                source: DataSourceKind::Simulated
            }
        );
        assert_eq!(controller.phase(), ControllerPhase::Idle);

        let snapshot = renderer.inner.snapshot().await;
        assert_eq!(snapshot.api_status, ApiStatus::Simulated);
        assert_eq!(snapshot.api_status_text, "Simulated Data");
        assert!(!snapshot.loading);
        assert_eq!(snapshot.alerts.len(), 3);
        assert_eq!(snapshot.series.len(), 1);
        assert_eq!(snapshot.series[0].value, 35);
        assert_eq!(
            snapshot.tags,
            StateTags {
                api_status: "simulated",
                temperature: "High",
                humidity: "High",
                device_status: "offline",
            }
        );

        let panel = snapshot.reading.unwrap();
        assert_eq!(panel.temperature_severity, Severity::High);
        assert_eq!(panel.humidity_severity, Severity::High);
        assert!(!panel.is_live);
    }

    #[tokio::test]
    async fn test_failed_refresh_only_touches_status_and_alerts() {
        let (controller, renderer, _) = simulated_only(
            Err(ConfigurationError("broken fallback".to_string())),
            &DashboardConfig::default(),
        );

        let outcome = controller.refresh(RefreshTrigger::Timer).await;

        assert_eq!(outcome, RefreshOutcome::Failed);
        assert_eq!(controller.phase(), ControllerPhase::Idle);
        assert!(controller.series().await.is_empty());

        let snapshot = renderer.inner.snapshot().await;
        assert_eq!(snapshot.api_status, ApiStatus::Error);
        assert_eq!(snapshot.tags.api_status, "error");
        assert!(snapshot.reading.is_none());
        assert_eq!(
            snapshot.alerts,
            vec![Alert::new(FETCH_FAILED_MESSAGE, AlertLevel::Danger)]
        );
        assert_eq!(renderer.readings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_series_is_bounded() {
        let mut config = DashboardConfig::default();
        config.max_series_points = 3;
        let (controller, _, _) =
            simulated_only(Ok(SensorReading::new(25, 45, DeviceStatus::Online)), &config);

        for _ in 0..5 {
            controller.refresh(RefreshTrigger::Manual).await;
        }

        assert_eq!(controller.series().await.len(), 3);
    }

    #[tokio::test]
    async fn test_manual_refresh_during_refresh_is_ignored() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let terminal_calls = Arc::new(AtomicUsize::new(0));

        let chain = FallbackChain::new(
            vec![Box::new(GatedAdapter {
                reading: SensorReading::new(21, 40, DeviceStatus::Online),
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            }) as Box<dyn SourceAdapter>],
            Box::new(FixedTerminal {
                result: Ok(SensorReading::new(27, 45, DeviceStatus::Online)),
                calls: Arc::clone(&terminal_calls),
            }),
        );
        let renderer = Arc::new(CountingRenderer::default());
        let controller = Arc::new(DashboardController::new(
            chain,
            renderer.clone() as Arc<dyn Renderer>,
            &DashboardConfig::default(),
        ));

        let first = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.refresh(RefreshTrigger::Timer).await })
        };

        entered.notified().await;
        assert_eq!(controller.phase(), ControllerPhase::Refreshing);

        let second = controller.refresh(RefreshTrigger::Manual).await;
        assert_eq!(second, RefreshOutcome::Skipped);

        release.notify_one();
        let first = first.await.unwrap();

        assert_eq!(
            first,
            RefreshOutcome::Completed {
                source: DataSourceKind::Weather
            }
        );
        assert_eq!(renderer.readings.load(Ordering::SeqCst), 1);
        assert_eq!(controller.series().await.len(), 1);
        assert_eq!(terminal_calls.load(Ordering::SeqCst), 0);
        assert!(controller.is_live().await);
        assert_eq!(controller.phase(), ControllerPhase::Idle);
    }

    #[tokio::test]
    async fn test_cancelled_refresh_returns_to_idle() {
        let entered = Arc::new(Notify::new());
        let chain = FallbackChain::new(
            vec![Box::new(GatedAdapter {
                reading: SensorReading::new(21, 40, DeviceStatus::Online),
                entered: Arc::clone(&entered),
                release: Arc::new(Notify::new()),
            }) as Box<dyn SourceAdapter>],
            Box::new(FixedTerminal {
                result: Ok(SensorReading::new(27, 45, DeviceStatus::Online)),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let controller = Arc::new(DashboardController::new(
            chain,
            Arc::new(SnapshotRenderer::new()),
            &DashboardConfig::default(),
        ));

        let task = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.refresh(RefreshTrigger::Manual).await })
        };
        entered.notified().await;
        task.abort();
        let _ = task.await;

        assert_eq!(controller.phase(), ControllerPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_refreshes_until_shutdown() {
        let mut config = DashboardConfig::default();
        config.refresh_interval_ms = 1000;
        let (controller, renderer, calls) =
            simulated_only(Ok(SensorReading::new(25, 45, DeviceStatus::Online)), &config);

        controller.start().await;
        assert!(controller.is_timer_running().await);

        // Startup refresh plus ticks at 1s and 2s.
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        controller.shutdown().await;
        tokio::time::sleep(Duration::from_millis(5000)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(renderer.readings.load(Ordering::SeqCst), 3);
        assert!(!controller.is_timer_running().await);
    }

    #[tokio::test]
    async fn test_shutdown_lets_in_flight_refresh_finish() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let chain = FallbackChain::new(
            vec![Box::new(GatedAdapter {
                reading: SensorReading::new(24, 50, DeviceStatus::Online),
                entered: Arc::clone(&entered),
                release: Arc::clone(&release),
            }) as Box<dyn SourceAdapter>],
            Box::new(FixedTerminal {
                result: Ok(SensorReading::new(27, 45, DeviceStatus::Online)),
                calls: Arc::new(AtomicUsize::new(0)),
            }),
        );
        let renderer = Arc::new(CountingRenderer::default());
        let controller = Arc::new(DashboardController::new(
            chain,
            renderer.clone() as Arc<dyn Renderer>,
            &DashboardConfig::default(),
        ));

        controller.start().await;
        entered.notified().await;

        let stopping = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.shutdown().await })
        };
        tokio::task::yield_now().await;
        assert!(!stopping.is_finished());

        release.notify_one();
        stopping.await.unwrap();

        let snapshot = renderer.inner.snapshot().await;
        assert!(!snapshot.loading);
        assert_eq!(snapshot.api_status, ApiStatus::Live);
        assert_eq!(snapshot.reading.unwrap().reading.temperature, 24);
        assert_eq!(snapshot.series.len(), 1);
        assert_eq!(renderer.readings.load(Ordering::SeqCst), 1);
        assert_eq!(controller.phase(), ControllerPhase::Idle);
        assert!(!controller.is_timer_running().await);
    }

    /// Terminal source whose temperature changes on every call.
    struct StepTerminal {
        next: std::sync::atomic::AtomicI64,
    }

    #[async_trait]
    impl TerminalSource for StepTerminal {
        fn kind(&self) -> DataSourceKind {
            DataSourceKind::Simulated
        }

        async fn acquire(&self) -> Result<SensorReading, ConfigurationError> {
            let step = self.next.fetch_add(1, Ordering::SeqCst);
            Ok(SensorReading::new(
                10 + step % 30,
                20 + step % 50,
                DeviceStatus::Online,
            ))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_readers_never_see_a_mixed_snapshot() {
        let config = DashboardConfig::default();
        let renderer = SnapshotRenderer::new();
        let controller = Arc::new(DashboardController::new(
            FallbackChain::new(
                Vec::new(),
                Box::new(StepTerminal {
                    next: std::sync::atomic::AtomicI64::new(0),
                }),
            ),
            Arc::new(renderer.clone()),
            &config,
        ));
        let done = Arc::new(AtomicBool::new(false));

        let reader = {
            let renderer = renderer.clone();
            let done = Arc::clone(&done);
            tokio::spawn(async move {
                while !done.load(Ordering::SeqCst) {
                    let snapshot = renderer.snapshot().await;
                    if let Some(panel) = &snapshot.reading {
                        assert_eq!(
                            snapshot.series.last().map(|p| p.value),
                            Some(panel.reading.temperature)
                        );
                        assert_eq!(
                            snapshot.alerts,
                            derive_alerts(
                                &panel.reading,
                                &config.temperature_thresholds,
                                &config.humidity_thresholds,
                            )
                        );
                    } else {
                        assert!(snapshot.series.is_empty());
                        assert!(snapshot.alerts.is_empty());
                    }
                    tokio::task::yield_now().await;
                }
            })
        };

        for _ in 0..200 {
            controller.refresh(RefreshTrigger::Manual).await;
        }
        done.store(true, Ordering::SeqCst);

        reader.await.unwrap();
    }
}
