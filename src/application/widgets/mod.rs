// Widget synchronizers - pure projections from dashboard state to view models
pub mod alerts;
pub mod live_trend;
pub mod map;
pub mod metrics;
pub mod sparkline;
pub mod status;
pub mod trends;
pub mod vehicles;

use crate::domain::connection::ConnectionState;
use serde::Serialize;

/// Computes the view of one visual surface. Projection never touches
/// shared state; the sync context decides whether to apply the result.
pub trait Synchronizer {
    type Input: ?Sized;
    type View: Clone + PartialEq + Serialize;

    fn project(&self, input: &Self::Input) -> Self::View;
}

/// Store `view` only when it differs from what is shown. Returns true on change.
pub fn apply<V: PartialEq>(slot: &mut V, view: V) -> bool {
    if *slot == view {
        return false;
    }
    *slot = view;
    true
}

/// Display tier shared by badges and status texts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    #[default]
    Healthy,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorView {
    pub state: ConnectionState,
    pub label: String,
    pub tier: Tier,
}

impl Default for IndicatorView {
    fn default() -> Self {
        ConnectionBadge.project(&ConnectionState::Disconnected)
    }
}

pub struct ConnectionBadge;

impl Synchronizer for ConnectionBadge {
    type Input = ConnectionState;
    type View = IndicatorView;

    fn project(&self, input: &ConnectionState) -> IndicatorView {
        let tier = match input {
            ConnectionState::Connected => Tier::Healthy,
            ConnectionState::Updating => Tier::Warning,
            ConnectionState::Disconnected | ConnectionState::Error => Tier::Critical,
        };
        IndicatorView {
            state: *input,
            label: input.label().to_string(),
            tier,
        }
    }
}

/// Everything a renderer needs to draw the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DashboardViews {
    pub clock: String,
    pub indicator: IndicatorView,
    pub data_points: String,
    pub metrics: metrics::MetricsView,
    pub crowd_sparkline: sparkline::SparklineView,
    pub co2_sparkline: sparkline::SparklineView,
    pub live_trend: live_trend::LiveTrendView,
    pub vehicles: vehicles::VehicleDistributionView,
    pub daily_trend: trends::DailyTrendView,
    pub historical_trend: trends::HistoricalTrendView,
    pub map: map::MapView,
    pub alerts: alerts::AlertsView,
    pub status: status::StatusView,
}

pub fn clock_label<Tz: chrono::TimeZone>(now: &chrono::DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%H:%M:%S").to_string()
}

pub fn data_points_label(count: usize) -> String {
    format!("Data points: {}", count)
}
