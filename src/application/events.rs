// Typed events consumed sequentially by the sync context
use crate::application::snapshot_fetcher::SnapshotBatch;
use crate::domain::snapshot::{DailyTrends, HistoricalAnalysis, LiveGraph};
use crate::domain::telemetry::TelemetryRecord;
use crate::error::SyncError;

#[derive(Debug)]
pub enum StreamEvent {
    Opened,
    Record(TelemetryRecord),
    Lost(String),
}

/// Which fetch produced a result; used for logging failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    InitialLoad,
    ManualRefresh,
    LiveGraph,
    DailyTrends,
    Historical,
}

#[derive(Debug)]
pub enum SyncEvent {
    Stream(StreamEvent),
    InitialLoad(Box<SnapshotBatch>),
    /// Metrics fetched on user request
    Refreshed(TelemetryRecord),
    LiveGraph(LiveGraph),
    DailyTrends(DailyTrends),
    Historical(HistoricalAnalysis),
    FetchFailed { kind: FetchKind, error: SyncError },
}

/// User-triggered commands accepted by the sync context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    RefreshMetrics,
    SetLiveWindow { minutes: u32 },
    LoadHistorical { days: u32 },
}
