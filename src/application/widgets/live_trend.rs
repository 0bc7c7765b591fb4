// Live trend chart: density and emissions over the most recent points
use super::Synchronizer;
use crate::domain::history::HistoryBuffer;
use crate::domain::snapshot::LiveGraph;
use crate::domain::telemetry::TelemetryRecord;
use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    pub label: String,
    /// Only stream points carry a full timestamp; fetched windows have labels.
    pub timestamp: Option<NaiveDateTime>,
    pub density: f64,
    pub co2: f64,
}

impl TrendPoint {
    pub fn from_record(record: &TelemetryRecord) -> Self {
        Self {
            label: record.timestamp.format("%H:%M").to_string(),
            timestamp: Some(record.timestamp),
            density: record.crowd_density().unwrap_or(0.0),
            co2: record.total_co2().unwrap_or(0.0),
        }
    }
}

/// Points of a fetched live-graph window, oldest first.
pub fn points_from_graph(graph: &LiveGraph) -> Vec<TrendPoint> {
    graph
        .crowd_graph
        .iter()
        .enumerate()
        .map(|(i, p)| TrendPoint {
            label: p.time.clone(),
            timestamp: None,
            density: p.density,
            co2: graph.co2_graph.get(i).copied().unwrap_or(0.0),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveTrendView {
    pub labels: Vec<String>,
    pub density: Vec<f64>,
    pub co2: Vec<f64>,
    pub density_axis: Axis,
    pub co2_axis: Axis,
}

impl Default for LiveTrendView {
    fn default() -> Self {
        LiveTrendChart.project(&[])
    }
}

pub struct LiveTrendChart;

impl LiveTrendChart {
    pub fn project_buffer(&self, buffer: &HistoryBuffer<TrendPoint>) -> LiveTrendView {
        self.project(&buffer.snapshot())
    }
}

impl Synchronizer for LiveTrendChart {
    type Input = [TrendPoint];
    type View = LiveTrendView;

    fn project(&self, input: &[TrendPoint]) -> LiveTrendView {
        LiveTrendView {
            labels: input.iter().map(|p| p.label.clone()).collect(),
            density: input.iter().map(|p| p.density).collect(),
            co2: input.iter().map(|p| p.co2).collect(),
            density_axis: Axis {
                title: "Crowd Density (%)".to_string(),
                min: Some(0.0),
                max: Some(100.0),
            },
            co2_axis: Axis {
                title: "CO₂ (kg)".to_string(),
                min: None,
                max: None,
            },
        }
    }
}
