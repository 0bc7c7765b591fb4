// Source traits for backend data access
use crate::domain::snapshot::{
    AlertRecord, DailyTrends, HistoricalAnalysis, LiveGraph, LocationSnapshot, SystemStatus,
};
use crate::domain::telemetry::TelemetryRecord;
use crate::error::SyncResult;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Raw event payloads of one open stream connection, in arrival order.
pub type FrameStream = BoxStream<'static, SyncResult<String>>;

#[async_trait]
pub trait DashboardSource: Send + Sync {
    /// Latest crowd / mobility / carbon summary
    async fn realtime_metrics(&self) -> SyncResult<TelemetryRecord>;

    /// Crowd and CO2 graph for the last `minutes`, plus vehicle distribution
    async fn live_graph(&self, minutes: u32) -> SyncResult<LiveGraph>;

    async fn locations(&self) -> SyncResult<Vec<LocationSnapshot>>;

    async fn alerts(&self) -> SyncResult<Vec<AlertRecord>>;

    async fn system_status(&self) -> SyncResult<SystemStatus>;

    async fn daily_trends(&self) -> SyncResult<DailyTrends>;

    async fn historical_analysis(&self, days: u32) -> SyncResult<HistoricalAnalysis>;
}

#[async_trait]
pub trait LiveStreamSource: Send + Sync {
    /// Open one push connection. Dropping the returned stream closes it.
    async fn open(&self) -> SyncResult<FrameStream>;
}
