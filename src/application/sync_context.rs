// Sync context - owns dashboard state and applies events in arrival order
use crate::application::dashboard_source::{DashboardSource, LiveStreamSource};
use crate::application::events::{Command, FetchKind, StreamEvent, SyncEvent};
use crate::application::indicator::{ConnectionIndicator, Outcome};
use crate::application::snapshot_fetcher::{SnapshotBatch, SnapshotFetcher};
use crate::application::stream_listener::{shutdown_requested, LiveStreamListener};
use crate::application::widgets::alerts::AlertList;
use crate::application::widgets::live_trend::{points_from_graph, LiveTrendChart, TrendPoint};
use crate::application::widgets::map::MapMarkers;
use crate::application::widgets::metrics::{MetricCards, MetricsInput};
use crate::application::widgets::sparkline::{self, Sparkline};
use crate::application::widgets::status::StatusBadges;
use crate::application::widgets::trends::{DailyTrendChart, HistoricalTrendChart};
use crate::application::widgets::vehicles::VehicleDistribution;
use crate::application::widgets::{
    apply, clock_label, data_points_label, ConnectionBadge, DashboardViews, Synchronizer,
};
use crate::domain::connection::ListenerState;
use crate::domain::history::HistoryBuffer;
use crate::domain::snapshot::{
    AlertRecord, DailyTrends, HistoricalAnalysis, LiveGraph, LocationSnapshot, SystemStatus,
    VehicleCount,
};
use crate::domain::telemetry::TelemetryRecord;
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::config::{FreshnessThresholds, SyncSettings};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

const EVENT_CHANNEL_CAPACITY: usize = 100;
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// Surfaces whose input changed and need re-projecting.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Dirty {
    pub indicator: bool,
    pub metrics: bool,
    pub sparklines: bool,
    pub live_trend: bool,
    pub vehicles: bool,
    pub daily_trend: bool,
    pub historical_trend: bool,
    pub map: bool,
    pub alerts: bool,
    pub status: bool,
    pub data_points: bool,
}

impl Dirty {
    pub fn all() -> Self {
        Self {
            indicator: true,
            metrics: true,
            sparklines: true,
            live_trend: true,
            vehicles: true,
            daily_trend: true,
            historical_trend: true,
            map: true,
            alerts: true,
            status: true,
            data_points: true,
        }
    }

    pub fn any(&self) -> bool {
        *self != Dirty::default()
    }
}

/// Stateless except for the configured freshness thresholds.
pub struct Synchronizers {
    status: StatusBadges,
}

impl Synchronizers {
    pub fn new(thresholds: FreshnessThresholds) -> Self {
        Self {
            status: StatusBadges::new(thresholds),
        }
    }
}

/// All mutable dashboard data. Only the sync loop writes it.
#[derive(Debug, Clone)]
pub struct DashboardState {
    raw_history: HistoryBuffer<TelemetryRecord>,
    live_trend: HistoryBuffer<TrendPoint>,
    crowd_sparkline: HistoryBuffer<f64>,
    co2_sparkline: HistoryBuffer<f64>,
    metrics: MetricsInput,
    vehicles: Vec<VehicleCount>,
    locations: Vec<LocationSnapshot>,
    alerts: Vec<AlertRecord>,
    status: Option<SystemStatus>,
    daily_trends: DailyTrends,
    historical: HistoricalAnalysis,
    indicator: ConnectionIndicator,
}

impl DashboardState {
    pub fn new(settings: &SyncSettings) -> SyncResult<Self> {
        Ok(Self {
            raw_history: HistoryBuffer::new(settings.raw_history_capacity)?,
            live_trend: HistoryBuffer::new(settings.live_chart_capacity)?,
            crowd_sparkline: sparkline::new_window(settings.sparkline_width)?,
            co2_sparkline: sparkline::new_window(settings.sparkline_width)?,
            metrics: MetricsInput::default(),
            vehicles: Vec::new(),
            locations: Vec::new(),
            alerts: Vec::new(),
            status: None,
            daily_trends: DailyTrends::default(),
            historical: HistoricalAnalysis::default(),
            indicator: ConnectionIndicator::new(settings.updating_revert()),
        })
    }

    pub fn raw_history(&self) -> &HistoryBuffer<TelemetryRecord> {
        &self.raw_history
    }

    pub fn live_trend(&self) -> &HistoryBuffer<TrendPoint> {
        &self.live_trend
    }

    pub fn indicator(&self) -> &ConnectionIndicator {
        &self.indicator
    }

    pub fn apply(&mut self, event: SyncEvent, now: Instant) -> Dirty {
        let mut dirty = Dirty::default();

        match event {
            SyncEvent::Stream(StreamEvent::Opened) => {
                self.observe(Outcome::StreamOpened, now, &mut dirty);
            }
            SyncEvent::Stream(StreamEvent::Lost(_)) => {
                self.observe(Outcome::StreamLost, now, &mut dirty);
            }
            SyncEvent::Stream(StreamEvent::Record(record)) => {
                self.live_trend
                    .append_bounded(TrendPoint::from_record(&record));
                self.ingest_metrics(&record, &mut dirty);
                self.raw_history.append_bounded(record);
                dirty.live_trend = true;
                dirty.data_points = true;
                self.observe(Outcome::DataReceived, now, &mut dirty);
            }
            SyncEvent::InitialLoad(batch) => self.apply_batch(*batch, now, &mut dirty),
            SyncEvent::Refreshed(record) => {
                self.ingest_metrics(&record, &mut dirty);
                self.observe(Outcome::RefreshSucceeded, now, &mut dirty);
            }
            SyncEvent::LiveGraph(graph) => {
                self.apply_live_graph(graph, &mut dirty);
                self.observe(Outcome::DataReceived, now, &mut dirty);
            }
            SyncEvent::DailyTrends(trends) => {
                self.daily_trends = trends;
                dirty.daily_trend = true;
                self.observe(Outcome::DataReceived, now, &mut dirty);
            }
            SyncEvent::Historical(analysis) => {
                self.historical = analysis;
                dirty.historical_trend = true;
                self.observe(Outcome::DataReceived, now, &mut dirty);
            }
            SyncEvent::FetchFailed { kind, error } => {
                warn!("{:?} fetch failed: {}", kind, error);
                self.observe(Outcome::FetchFailed, now, &mut dirty);
            }
        }

        dirty
    }

    /// Timed indicator revert.
    pub fn tick(&mut self, now: Instant) -> Dirty {
        Dirty {
            indicator: self.indicator.tick(now),
            ..Dirty::default()
        }
    }

    fn observe(&mut self, outcome: Outcome, now: Instant, dirty: &mut Dirty) {
        dirty.indicator |= self.indicator.observe(outcome, now);
    }

    fn ingest_metrics(&mut self, record: &TelemetryRecord, dirty: &mut Dirty) {
        if let Some(crowd) = &record.crowd {
            self.crowd_sparkline.append_bounded(crowd.density);
            dirty.sparklines = true;
        }
        if let Some(mobility) = &record.mobility {
            self.co2_sparkline.append_bounded(mobility.total_co2);
            dirty.sparklines = true;
        }
        self.metrics.ingest(record);
        dirty.metrics = true;
    }

    fn apply_live_graph(&mut self, graph: LiveGraph, dirty: &mut Dirty) {
        self.live_trend.replace_all(points_from_graph(&graph));
        self.vehicles = graph.vehicle_distribution;
        dirty.live_trend = true;
        dirty.vehicles = true;
    }

    /// Applies every field that succeeded; failures only affect the indicator.
    fn apply_batch(&mut self, batch: SnapshotBatch, now: Instant, dirty: &mut Dirty) {
        let failures = batch.failures();

        match batch.metrics {
            Ok(record) => self.ingest_metrics(&record, dirty),
            Err(e) => warn!("Initial metrics load failed: {}", e),
        }
        match batch.live_graph {
            Ok(graph) => self.apply_live_graph(graph, dirty),
            Err(e) => warn!("Initial live graph load failed: {}", e),
        }
        match batch.locations {
            Ok(locations) => {
                self.locations = locations;
                dirty.map = true;
            }
            Err(e) => warn!("Initial location load failed: {}", e),
        }
        match batch.alerts {
            Ok(alerts) => {
                self.alerts = alerts;
                dirty.alerts = true;
            }
            Err(e) => warn!("Initial alert load failed: {}", e),
        }
        match batch.status {
            Ok(status) => {
                self.status = Some(status);
                dirty.status = true;
            }
            Err(e) => warn!("Initial system status load failed: {}", e),
        }
        match batch.daily_trends {
            Ok(trends) => {
                self.daily_trends = trends;
                dirty.daily_trend = true;
            }
            Err(e) => warn!("Initial daily trend load failed: {}", e),
        }

        if failures > 0 {
            self.observe(Outcome::FetchFailed, now, dirty);
        } else {
            self.observe(Outcome::DataReceived, now, dirty);
        }
    }

    /// Full projection of the current state, published before any event.
    pub fn initial_views(&self, sync: &Synchronizers) -> DashboardViews {
        let mut views = DashboardViews::default();
        self.render(&mut views, &Dirty::all(), sync);
        views
    }

    /// Re-project the dirty surfaces into `views`. Returns true when any
    /// visible output changed.
    pub fn render(&self, views: &mut DashboardViews, dirty: &Dirty, sync: &Synchronizers) -> bool {
        let mut changed = false;

        if dirty.indicator {
            changed |= apply(
                &mut views.indicator,
                ConnectionBadge.project(&self.indicator.state()),
            );
        }
        if dirty.metrics {
            changed |= apply(&mut views.metrics, MetricCards.project(&self.metrics));
        }
        if dirty.sparklines {
            changed |= apply(
                &mut views.crowd_sparkline,
                Sparkline.project(&self.crowd_sparkline),
            );
            changed |= apply(
                &mut views.co2_sparkline,
                Sparkline.project(&self.co2_sparkline),
            );
        }
        if dirty.live_trend {
            changed |= apply(
                &mut views.live_trend,
                LiveTrendChart.project_buffer(&self.live_trend),
            );
        }
        if dirty.vehicles {
            changed |= apply(
                &mut views.vehicles,
                VehicleDistribution.project(&self.vehicles),
            );
        }
        if dirty.daily_trend {
            changed |= apply(
                &mut views.daily_trend,
                DailyTrendChart.project(&self.daily_trends),
            );
        }
        if dirty.historical_trend {
            changed |= apply(
                &mut views.historical_trend,
                HistoricalTrendChart.project(&self.historical),
            );
        }
        if dirty.map {
            changed |= apply(&mut views.map, MapMarkers.project(&self.locations));
        }
        if dirty.alerts {
            changed |= apply(&mut views.alerts, AlertList.project(&self.alerts));
        }
        if dirty.status {
            if let Some(status) = &self.status {
                changed |= apply(&mut views.status, sync.status.project(status));
            }
        }
        if dirty.data_points {
            changed |= apply(
                &mut views.data_points,
                data_points_label(self.raw_history.len()),
            );
        }

        changed
    }
}

async fn until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

struct SyncLoop {
    state: DashboardState,
    synchronizers: Synchronizers,
    fetcher: SnapshotFetcher,
    settings: SyncSettings,
    live_minutes: u32,
    events_tx: mpsc::Sender<SyncEvent>,
    events_rx: mpsc::Receiver<SyncEvent>,
    commands_rx: mpsc::Receiver<Command>,
    views_tx: watch::Sender<DashboardViews>,
    shutdown: watch::Receiver<bool>,
}

impl SyncLoop {
    async fn run(mut self) {
        info!("Sync loop started");
        self.spawn_fetch(FetchKind::InitialLoad, {
            let fetcher = self.fetcher.clone();
            async move { Ok(SyncEvent::InitialLoad(Box::new(fetcher.fetch_all().await))) }
        });

        let period = self.settings.refresh_interval();
        let mut refresh = tokio::time::interval_at(Instant::now() + period, period);
        refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut clock = tokio::time::interval(self.settings.clock_tick());
        clock.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut shutdown = self.shutdown.clone();
        loop {
            let revert_at = self.state.indicator().revert_deadline();
            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => break,
                Some(event) = self.events_rx.recv() => {
                    let dirty = self.state.apply(event, Instant::now());
                    self.publish(dirty);
                }
                Some(command) = self.commands_rx.recv() => self.handle_command(command),
                _ = refresh.tick() => self.refresh_trends(),
                _ = clock.tick() => {
                    let label = clock_label(&chrono::Local::now());
                    self.views_tx.send_if_modified(|views| apply(&mut views.clock, label));
                }
                _ = until(revert_at) => {
                    let dirty = self.state.tick(Instant::now());
                    self.publish(dirty);
                }
            }
        }

        info!("Sync loop stopped");
    }

    fn publish(&self, dirty: Dirty) {
        if !dirty.any() {
            return;
        }
        let state = &self.state;
        let synchronizers = &self.synchronizers;
        let changed = self
            .views_tx
            .send_if_modified(|views| state.render(views, &dirty, synchronizers));
        debug!("Published views (changed: {})", changed);
    }

    fn handle_command(&mut self, command: Command) {
        debug!("Command {:?}", command);
        let fetcher = self.fetcher.clone();
        match command {
            Command::RefreshMetrics => {
                self.spawn_fetch(FetchKind::ManualRefresh, async move {
                    fetcher.fetch_metrics().await.map(SyncEvent::Refreshed)
                });
            }
            Command::SetLiveWindow { minutes } => {
                self.live_minutes = minutes;
                self.spawn_fetch(FetchKind::LiveGraph, async move {
                    fetcher.fetch_live_graph(minutes).await.map(SyncEvent::LiveGraph)
                });
            }
            Command::LoadHistorical { days } => {
                self.spawn_fetch(FetchKind::Historical, async move {
                    fetcher.fetch_historical(days).await.map(SyncEvent::Historical)
                });
            }
        }
    }

    fn refresh_trends(&self) {
        debug!("Periodic trend refresh ({} min window)", self.live_minutes);
        let fetcher = self.fetcher.clone();
        let minutes = self.live_minutes;
        self.spawn_fetch(FetchKind::LiveGraph, async move {
            fetcher.fetch_live_graph(minutes).await.map(SyncEvent::LiveGraph)
        });
        let fetcher = self.fetcher.clone();
        self.spawn_fetch(FetchKind::DailyTrends, async move {
            fetcher.fetch_daily_trends().await.map(SyncEvent::DailyTrends)
        });
    }

    /// Run a fetch off the loop; its result comes back through the event channel.
    fn spawn_fetch<F>(&self, kind: FetchKind, fetch: F)
    where
        F: Future<Output = SyncResult<SyncEvent>> + Send + 'static,
    {
        let events = self.events_tx.clone();
        let mut shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = shutdown_requested(&mut shutdown) => {}
                result = fetch => {
                    let event = result.unwrap_or_else(|error| SyncEvent::FetchFailed { kind, error });
                    let _ = events.send(event).await;
                }
            }
        });
    }
}

/// Handle to the running synchronization core: construct with `start`,
/// dispose with `shutdown`.
pub struct SyncContext {
    views: watch::Receiver<DashboardViews>,
    commands: mpsc::Sender<Command>,
    shutdown: watch::Sender<bool>,
    listener_state: watch::Receiver<ListenerState>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl SyncContext {
    pub fn start(
        settings: SyncSettings,
        thresholds: FreshnessThresholds,
        source: Arc<dyn DashboardSource>,
        stream: Arc<dyn LiveStreamSource>,
    ) -> SyncResult<Self> {
        let state = DashboardState::new(&settings)?;
        info!(
            "Sync context starting (raw history {}, live chart {} points)",
            state.raw_history().capacity(),
            state.live_trend().capacity()
        );
        let fetcher = SnapshotFetcher::new(source, settings.live_window_minutes)?;
        let historical_days = settings.historical_days;

        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let synchronizers = Synchronizers::new(thresholds);
        let (views_tx, views_rx) = watch::channel(state.initial_views(&synchronizers));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let listener = LiveStreamListener::new(stream, settings.reconnect_delay());
        let listener_state = listener.state();
        let listener_task = tokio::spawn(listener.run(events_tx.clone(), shutdown_rx.clone()));

        let sync_loop = SyncLoop {
            state,
            synchronizers,
            fetcher,
            live_minutes: settings.live_window_minutes,
            settings,
            events_tx,
            events_rx,
            commands_rx,
            views_tx,
            shutdown: shutdown_rx,
        };
        let loop_task = tokio::spawn(sync_loop.run());

        // Historical analysis loads alongside the initial batch
        commands_tx
            .try_send(Command::LoadHistorical {
                days: historical_days,
            })
            .map_err(|_| SyncError::Closed)?;

        Ok(Self {
            views: views_rx,
            commands: commands_tx,
            shutdown: shutdown_tx,
            listener_state,
            tasks: Mutex::new(vec![listener_task, loop_task]),
        })
    }

    pub fn views(&self) -> watch::Receiver<DashboardViews> {
        self.views.clone()
    }

    pub fn current_views(&self) -> DashboardViews {
        self.views.borrow().clone()
    }

    pub fn listener_state(&self) -> ListenerState {
        *self.listener_state.borrow()
    }

    /// Validate and enqueue a user command.
    pub async fn send(&self, command: Command) -> SyncResult<()> {
        match command {
            Command::SetLiveWindow { minutes: 0 } => {
                return Err(SyncError::Config("minutes must be a positive integer".to_string()));
            }
            Command::LoadHistorical { days: 0 } => {
                return Err(SyncError::Config("days must be a positive integer".to_string()));
            }
            _ => {}
        }
        if *self.shutdown.borrow() {
            return Err(SyncError::Closed);
        }
        self.commands.send(command).await.map_err(|_| SyncError::Closed)
    }

    /// Stop the listener, timers and loop. Safe to call more than once.
    pub fn shutdown(&self) {
        if !self.shutdown.send_replace(true) {
            info!("Sync context shutting down");
        }
    }

    pub fn is_shut_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Wait for every task to finish after `shutdown`.
    pub async fn join(&self) {
        let tasks: Vec<JoinHandle<()>> = self.tasks.lock().await.drain(..).collect();
        for task in tasks {
            if let Err(e) = task.await {
                error!("Sync task ended abnormally: {}", e);
            }
        }
    }
}

impl Drop for SyncContext {
    fn drop(&mut self) {
        self.shutdown.send_replace(true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_source::FrameStream;
    use crate::application::snapshot_fetcher::tests::{at, FakeSource};
    use crate::application::widgets::alerts::AlertListState;
    use crate::application::widgets::Tier;
    use crate::domain::connection::ConnectionState;
    use crate::domain::snapshot::{
        AlertKind, AlertPriority, DailyTrend, LocationStatus, OverallStatus,
    };
    use crate::domain::telemetry::{CrowdReading, CrowdStatus, MobilityReading, TrafficStatus};
    use async_trait::async_trait;
    use futures::StreamExt;
    use std::time::Duration;

    fn record(density: f64, co2: f64) -> TelemetryRecord {
        TelemetryRecord::new(
            at(18, 30),
            Some(CrowdReading {
                density,
                status: CrowdStatus::High,
                anomalies: None,
                readings: None,
            }),
            Some(MobilityReading {
                total_co2: co2,
                vehicle_types: 3,
                trips: None,
                status: TrafficStatus::Busy,
            }),
            None,
        )
    }

    fn loaded_batch() -> SnapshotBatch {
        SnapshotBatch {
            metrics: Err(SyncError::Network("timeout".to_string())),
            live_graph: Ok(LiveGraph::default()),
            locations: Ok(vec![LocationSnapshot {
                name: "Metro Station".to_string(),
                lat: 12.978,
                lng: 77.601,
                density: 65.0,
                status: LocationStatus::Medium,
                anomalies: 1,
                readings: 12,
            }]),
            alerts: Ok(vec![AlertRecord {
                kind: AlertKind::Anomaly,
                priority: AlertPriority::Medium,
                location: "Parking Lot A".to_string(),
                value: None,
                timestamp: at(18, 0),
            }]),
            status: Ok(SystemStatus {
                overall_status: OverallStatus::Healthy,
                freshness_minutes: 3.0,
            }),
            daily_trends: Ok(DailyTrends::default()),
        }
    }

    fn render_all(state: &DashboardState, views: &mut DashboardViews) -> bool {
        state.render(views, &Dirty::all(), &Synchronizers::new(FreshnessThresholds::default()))
    }

    #[test]
    fn test_partial_batch_applies_successful_fields() {
        let now = Instant::now();
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        let dirty = state.apply(SyncEvent::InitialLoad(Box::new(loaded_batch())), now);

        assert!(dirty.map && dirty.alerts && dirty.status);
        assert!(!dirty.metrics);
        assert_eq!(state.indicator().state(), ConnectionState::Error);

        let mut views = DashboardViews::default();
        render_all(&state, &mut views);
        assert_eq!(views.map.markers.len(), 1);
        assert_eq!(views.alerts.count_label, "Alerts: 1");
        assert_eq!(views.status.freshness_tier, Tier::Warning);
    }

    #[test]
    fn test_stream_record_updates_live_surfaces_only() {
        let now = Instant::now();
        let sync = Synchronizers::new(FreshnessThresholds::default());
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        let mut views = DashboardViews::default();
        state.apply(SyncEvent::InitialLoad(Box::new(loaded_batch())), now);
        state.apply(
            SyncEvent::Historical(HistoricalAnalysis {
                daily_trends: vec![DailyTrend {
                    date: "2024-04-30".to_string(),
                    crowd_density: 50.0,
                    co2_level: 450.0,
                    vehicle_diversity: None,
                }],
                hourly_patterns: Vec::new(),
            }),
            now,
        );
        render_all(&state, &mut views);
        let before = views.clone();
        let locations_before = state.locations.clone();

        let dirty = state.apply(
            SyncEvent::Stream(StreamEvent::Record(record(87.0, 12.3))),
            now,
        );
        assert!(!dirty.map && !dirty.alerts && !dirty.historical_trend && !dirty.status);
        assert!(state.render(&mut views, &dirty, &sync));

        let last = state.live_trend().latest().unwrap();
        assert_eq!(last.timestamp, Some(at(18, 30)));
        assert_eq!(last.density, 87.0);
        assert_eq!(last.co2, 12.3);

        let crowd_status = views.metrics.crowd_status.clone().unwrap();
        assert_eq!(crowd_status.text, "High");
        assert_eq!(crowd_status.tier, Tier::Critical);
        assert_eq!(views.data_points, "Data points: 1");

        assert_eq!(views.map, before.map);
        assert_eq!(views.alerts, before.alerts);
        assert_eq!(views.historical_trend, before.historical_trend);
        assert_eq!(views.status, before.status);
        assert_eq!(state.locations, locations_before);
        assert_eq!(state.raw_history().len(), 1);
    }

    #[test]
    fn test_render_twice_is_noop() {
        let now = Instant::now();
        let sync = Synchronizers::new(FreshnessThresholds::default());
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        let mut views = state.initial_views(&sync);

        let dirty = state.apply(SyncEvent::InitialLoad(Box::new(loaded_batch())), now);
        assert!(state.render(&mut views, &dirty, &sync));
        let rendered = views.clone();
        assert!(!state.render(&mut views, &dirty, &sync));
        assert!(!render_all(&state, &mut views));
        assert_eq!(views, rendered);
    }

    #[test]
    fn test_initial_views_show_baselines() {
        let sync = Synchronizers::new(FreshnessThresholds::default());
        let state = DashboardState::new(&SyncSettings::default()).unwrap();
        let mut views = state.initial_views(&sync);

        assert_eq!(views.crowd_sparkline.values, vec![50.0; 10]);
        assert_eq!(views.co2_sparkline.values, vec![50.0; 10]);
        assert_eq!(views.data_points, "Data points: 0");
        assert!(!render_all(&state, &mut views));
    }

    #[test]
    fn test_successful_data_clears_fetch_error() {
        let now = Instant::now();
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        state.apply(SyncEvent::Stream(StreamEvent::Opened), now);
        state.apply(
            SyncEvent::FetchFailed {
                kind: FetchKind::DailyTrends,
                error: SyncError::Network("timeout".to_string()),
            },
            now,
        );
        assert_eq!(state.indicator().state(), ConnectionState::Error);

        let dirty = state.apply(SyncEvent::LiveGraph(LiveGraph::default()), now);
        assert!(dirty.indicator);
        assert_eq!(state.indicator().state(), ConnectionState::Connected);

        state.apply(
            SyncEvent::FetchFailed {
                kind: FetchKind::LiveGraph,
                error: SyncError::Decode("bad body".to_string()),
            },
            now,
        );
        for _ in 0..5 {
            state.apply(
                SyncEvent::Stream(StreamEvent::Record(record(60.0, 4.0))),
                now,
            );
        }
        assert_eq!(state.indicator().state(), ConnectionState::Connected);
    }

    #[test]
    fn test_buffers_stay_bounded() {
        let now = Instant::now();
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        for i in 0..250 {
            state.apply(
                SyncEvent::Stream(StreamEvent::Record(record((i % 100) as f64, 1.0))),
                now,
            );
        }
        assert_eq!(state.raw_history().len(), 100);
        assert_eq!(state.live_trend().len(), 20);
        assert_eq!(state.crowd_sparkline.len(), 10);
        assert_eq!(state.raw_history().latest().unwrap().crowd_density(), Some(49.0));

        // Fetched window replaces the streamed points wholesale
        state.apply(SyncEvent::LiveGraph(LiveGraph::default()), now);
        assert!(state.live_trend().is_empty());
        assert_eq!(state.raw_history().len(), 100);
    }

    #[test]
    fn test_refresh_marks_updating_then_reverts() {
        let now = Instant::now();
        let mut state = DashboardState::new(&SyncSettings::default()).unwrap();
        state.apply(SyncEvent::Refreshed(record(40.0, 2.0)), now);
        assert_eq!(state.indicator().state(), ConnectionState::Updating);

        assert!(!state.tick(now + Duration::from_millis(999)).indicator);
        assert!(state.tick(now + Duration::from_millis(1000)).indicator);
        assert_eq!(state.indicator().state(), ConnectionState::Connected);
    }

    struct OneRecordStream;

    #[async_trait]
    impl LiveStreamSource for OneRecordStream {
        async fn open(&self) -> SyncResult<FrameStream> {
            let frames: Vec<SyncResult<String>> = vec![Ok(
                r#"{"timestamp": "2024-05-01T18:30:00", "crowd": {"density": 87, "status": "high"}, "mobility": {"total_co2": 12.3, "vehicle_types": 3, "status": "busy"}}"#
                    .to_string(),
            )];
            Ok(futures::stream::iter(frames)
                .chain(futures::stream::pending())
                .boxed())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_context_lifecycle() {
        let source = Arc::new(FakeSource::default());
        let context = SyncContext::start(
            SyncSettings::default(),
            FreshnessThresholds::default(),
            source.clone(),
            Arc::new(OneRecordStream),
        )
        .unwrap();

        let mut views = context.views();
        views
            .wait_for(|v| {
                v.data_points == "Data points: 1"
                    && v.indicator.state == ConnectionState::Connected
                    && v.map.markers.len() == 1
            })
            .await
            .unwrap();
        assert_eq!(context.listener_state(), ListenerState::Open);

        assert!(matches!(
            context.send(Command::SetLiveWindow { minutes: 0 }).await,
            Err(SyncError::Config(_))
        ));
        context
            .send(Command::SetLiveWindow { minutes: 45 })
            .await
            .unwrap();
        context.send(Command::RefreshMetrics).await.unwrap();
        views
            .wait_for(|v| v.indicator.state == ConnectionState::Updating)
            .await
            .unwrap();
        views
            .wait_for(|v| v.indicator.state == ConnectionState::Connected)
            .await
            .unwrap();

        {
            let requests = source.requests.lock().unwrap();
            assert!(requests.contains(&"live_graph:45".to_string()));
            assert!(requests.contains(&"historical:30".to_string()));
        }

        context.shutdown();
        context.shutdown();
        context.join().await;
        assert!(context.is_shut_down());
        assert_eq!(context.listener_state(), ListenerState::Idle);
        assert!(matches!(
            context.send(Command::RefreshMetrics).await,
            Err(SyncError::Closed)
        ));
    }
}
