// HTTP backend implementation of the dashboard and stream sources
use crate::application::dashboard_source::{DashboardSource, FrameStream, LiveStreamSource};
use crate::domain::snapshot::{
    AlertRecord, DailyTrends, HistoricalAnalysis, LiveGraph, LocationSnapshot, SystemStatus,
};
use crate::domain::telemetry::TelemetryRecord;
use crate::error::{SyncError, SyncResult};
use crate::infrastructure::config::{endpoint_url, BackendSettings};
use crate::infrastructure::sse::event_stream;
use crate::infrastructure::wire::{
    self, WireAlert, WireDailyTrends, WireHistorical, WireLiveGraph, WireLocation,
    WireSystemStatus, WireTelemetry,
};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
    stream_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(settings: &BackendSettings) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        // The push channel stays open indefinitely, so only connecting is bounded
        let stream_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            client,
            stream_client,
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, u32)],
    ) -> SyncResult<T> {
        let url = endpoint_url(&self.base_url, path);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("{}: {}", path, e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::Network(format!(
                "{} failed with status {}: {}",
                path, status, body
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| SyncError::Network(format!("{}: {}", path, e)))?;
        serde_json::from_slice(&body).map_err(|e| SyncError::Decode(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl DashboardSource for HttpBackend {
    async fn realtime_metrics(&self) -> SyncResult<TelemetryRecord> {
        let data: WireTelemetry = self.get_json("/api/realtime-metrics", &[]).await?;
        wire::telemetry_to_domain(data)
    }

    async fn live_graph(&self, minutes: u32) -> SyncResult<LiveGraph> {
        let data: WireLiveGraph = self
            .get_json("/api/live-graph", &[("minutes", minutes)])
            .await?;
        Ok(wire::live_graph_to_domain(data))
    }

    async fn locations(&self) -> SyncResult<Vec<LocationSnapshot>> {
        let data: Vec<WireLocation> = self.get_json("/api/location-data", &[]).await?;
        Ok(wire::locations_to_domain(data))
    }

    async fn alerts(&self) -> SyncResult<Vec<AlertRecord>> {
        let data: Vec<WireAlert> = self.get_json("/api/alerts", &[]).await?;
        wire::alerts_to_domain(data)
    }

    async fn system_status(&self) -> SyncResult<SystemStatus> {
        let data: WireSystemStatus = self.get_json("/api/system-status", &[]).await?;
        wire::system_status_to_domain(data)
    }

    async fn daily_trends(&self) -> SyncResult<DailyTrends> {
        let data: WireDailyTrends = self.get_json("/api/daily-trends", &[]).await?;
        Ok(wire::daily_trends_to_domain(data))
    }

    async fn historical_analysis(&self, days: u32) -> SyncResult<HistoricalAnalysis> {
        let data: WireHistorical = self
            .get_json("/api/historical-analysis", &[("days", days)])
            .await?;
        Ok(wire::historical_to_domain(data))
    }
}

#[async_trait]
impl LiveStreamSource for HttpBackend {
    async fn open(&self) -> SyncResult<FrameStream> {
        let url = endpoint_url(&self.base_url, "/stream");
        let response = self
            .stream_client
            .get(&url)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| SyncError::Network(format!("/stream: {}", e)))?;

        if !response.status().is_success() {
            return Err(SyncError::Network(format!(
                "/stream failed with status {}",
                response.status()
            )));
        }

        Ok(event_stream(response.bytes_stream()).boxed())
    }
}
