// Snapshot fetcher - one-shot pulls of dashboard state
use crate::application::dashboard_source::DashboardSource;
use crate::domain::snapshot::{
    AlertRecord, DailyTrends, HistoricalAnalysis, LiveGraph, LocationSnapshot, SystemStatus,
};
use crate::domain::telemetry::TelemetryRecord;
use crate::error::{SyncError, SyncResult};
use std::sync::Arc;

/// Per-field results of a bulk load. Each field succeeds or fails on its own.
#[derive(Debug)]
pub struct SnapshotBatch {
    pub metrics: SyncResult<TelemetryRecord>,
    pub live_graph: SyncResult<LiveGraph>,
    pub locations: SyncResult<Vec<LocationSnapshot>>,
    pub alerts: SyncResult<Vec<AlertRecord>>,
    pub status: SyncResult<SystemStatus>,
    pub daily_trends: SyncResult<DailyTrends>,
}

impl SnapshotBatch {
    pub fn failures(&self) -> usize {
        [
            self.metrics.is_err(),
            self.live_graph.is_err(),
            self.locations.is_err(),
            self.alerts.is_err(),
            self.status.is_err(),
            self.daily_trends.is_err(),
        ]
        .into_iter()
        .filter(|failed| *failed)
        .count()
    }
}

fn positive(name: &str, value: u32) -> SyncResult<u32> {
    if value == 0 {
        return Err(SyncError::Config(format!("{} must be a positive integer", name)));
    }
    Ok(value)
}

#[derive(Clone)]
pub struct SnapshotFetcher {
    source: Arc<dyn DashboardSource>,
    live_minutes: u32,
}

impl SnapshotFetcher {
    pub fn new(source: Arc<dyn DashboardSource>, live_minutes: u32) -> SyncResult<Self> {
        Ok(Self {
            source,
            live_minutes: positive("live window minutes", live_minutes)?,
        })
    }

    /// Issue every initial request concurrently and collect each outcome.
    pub async fn fetch_all(&self) -> SnapshotBatch {
        let (metrics, live_graph, locations, alerts, status, daily_trends) = tokio::join!(
            self.source.realtime_metrics(),
            self.source.live_graph(self.live_minutes),
            self.source.locations(),
            self.source.alerts(),
            self.source.system_status(),
            self.source.daily_trends(),
        );

        SnapshotBatch {
            metrics,
            live_graph,
            locations,
            alerts,
            status,
            daily_trends,
        }
    }

    pub async fn fetch_metrics(&self) -> SyncResult<TelemetryRecord> {
        self.source.realtime_metrics().await
    }

    pub async fn fetch_live_graph(&self, minutes: u32) -> SyncResult<LiveGraph> {
        let minutes = positive("minutes", minutes)?;
        self.source.live_graph(minutes).await
    }

    pub async fn fetch_daily_trends(&self) -> SyncResult<DailyTrends> {
        self.source.daily_trends().await
    }

    pub async fn fetch_historical(&self, days: u32) -> SyncResult<HistoricalAnalysis> {
        let days = positive("days", days)?;
        self.source.historical_analysis(days).await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::snapshot::{LocationStatus, OverallStatus, VehicleCount};
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Scripted in-memory backend shared by the application tests.
    #[derive(Default)]
    pub struct FakeSource {
        pub fail_locations: bool,
        pub requests: Mutex<Vec<String>>,
    }

    pub fn at(h: u32, m: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    impl FakeSource {
        fn record(&self, request: String) {
            self.requests.lock().unwrap().push(request);
        }
    }

    #[async_trait]
    impl DashboardSource for FakeSource {
        async fn realtime_metrics(&self) -> SyncResult<TelemetryRecord> {
            self.record("metrics".to_string());
            Ok(TelemetryRecord::new(at(9, 0), None, None, None))
        }

        async fn live_graph(&self, minutes: u32) -> SyncResult<LiveGraph> {
            self.record(format!("live_graph:{}", minutes));
            Ok(LiveGraph {
                vehicle_distribution: vec![VehicleCount {
                    vehicle: "Bus".to_string(),
                    count: 3,
                }],
                ..LiveGraph::default()
            })
        }

        async fn locations(&self) -> SyncResult<Vec<LocationSnapshot>> {
            self.record("locations".to_string());
            if self.fail_locations {
                return Err(SyncError::Network("connection refused".to_string()));
            }
            Ok(vec![LocationSnapshot {
                name: "Food Court".to_string(),
                lat: 12.9782,
                lng: 77.5985,
                density: 40.0,
                status: LocationStatus::Low,
                anomalies: 0,
                readings: 0,
            }])
        }

        async fn alerts(&self) -> SyncResult<Vec<AlertRecord>> {
            self.record("alerts".to_string());
            Ok(Vec::new())
        }

        async fn system_status(&self) -> SyncResult<SystemStatus> {
            self.record("status".to_string());
            Ok(SystemStatus {
                overall_status: OverallStatus::Healthy,
                freshness_minutes: 1.0,
            })
        }

        async fn daily_trends(&self) -> SyncResult<DailyTrends> {
            self.record("daily_trends".to_string());
            Ok(DailyTrends::default())
        }

        async fn historical_analysis(&self, days: u32) -> SyncResult<HistoricalAnalysis> {
            self.record(format!("historical:{}", days));
            Ok(HistoricalAnalysis::default())
        }
    }

    #[tokio::test]
    async fn test_fetch_all_applies_partial_success() {
        let source = Arc::new(FakeSource {
            fail_locations: true,
            ..FakeSource::default()
        });
        let fetcher = SnapshotFetcher::new(source.clone(), 30).unwrap();

        let batch = fetcher.fetch_all().await;

        assert_eq!(batch.failures(), 1);
        assert!(batch.locations.is_err());
        assert!(batch.metrics.is_ok());
        assert_eq!(batch.live_graph.unwrap().vehicle_distribution.len(), 1);
        assert!(batch.alerts.is_ok());
        assert!(batch.status.is_ok());
        assert!(batch.daily_trends.is_ok());
        assert!(source
            .requests
            .lock()
            .unwrap()
            .contains(&"live_graph:30".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_parameters_rejected_before_request() {
        let source = Arc::new(FakeSource::default());
        let fetcher = SnapshotFetcher::new(source.clone(), 30).unwrap();

        assert!(matches!(
            fetcher.fetch_historical(0).await,
            Err(SyncError::Config(_))
        ));
        assert!(matches!(
            fetcher.fetch_live_graph(0).await,
            Err(SyncError::Config(_))
        ));
        assert!(source.requests.lock().unwrap().is_empty());

        fetcher.fetch_historical(7).await.unwrap();
        assert_eq!(
            source.requests.lock().unwrap().as_slice(),
            &["historical:7".to_string()]
        );
    }

    #[test]
    fn test_zero_live_window_rejected() {
        let source = Arc::new(FakeSource::default());
        assert!(SnapshotFetcher::new(source, 0).is_err());
    }
}
