// Snapshot domain models: values that replace their predecessor wholesale
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationStatus {
    Low,
    Medium,
    High,
}

impl LocationStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high" => LocationStatus::High,
            "medium" => LocationStatus::Medium,
            _ => LocationStatus::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Low => "low",
            LocationStatus::Medium => "medium",
            LocationStatus::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationSnapshot {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub density: f64,
    pub status: LocationStatus,
    pub anomalies: u32,
    pub readings: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    HighDensity,
    Anomaly,
    HighCo2,
    Other,
}

impl AlertKind {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high_density" => AlertKind::HighDensity,
            "anomaly" => AlertKind::Anomaly,
            "high_co2" => AlertKind::HighCo2,
            _ => AlertKind::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPriority {
    Low,
    Medium,
    High,
}

impl AlertPriority {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high" => AlertPriority::High,
            "medium" => AlertPriority::Medium,
            _ => AlertPriority::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertPriority::Low => "low",
            AlertPriority::Medium => "medium",
            AlertPriority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub kind: AlertKind,
    pub priority: AlertPriority,
    pub location: String,
    pub value: Option<f64>,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverallStatus {
    Healthy,
    Degraded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SystemStatus {
    pub overall_status: OverallStatus,
    pub freshness_minutes: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrowdGraphPoint {
    pub time: String,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleCount {
    pub vehicle: String,
    pub count: u32,
}

/// Authoritative "last N minutes" window returned by the live-graph endpoint.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveGraph {
    pub crowd_graph: Vec<CrowdGraphPoint>,
    pub co2_graph: Vec<f64>,
    pub vehicle_distribution: Vec<VehicleCount>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyDensity {
    pub hour: u8,
    pub density: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DailyTrends {
    pub crowd_trends: Vec<HourlyDensity>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTrend {
    /// `YYYY-MM-DD` as sent by the backend
    pub date: String,
    pub crowd_density: f64,
    pub co2_level: f64,
    /// Distinct vehicle types seen that day
    pub vehicle_diversity: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourlyPattern {
    pub hour: u8,
    pub crowd_density: f64,
    pub co2_level: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoricalAnalysis {
    pub daily_trends: Vec<DailyTrend>,
    pub hourly_patterns: Vec<HourlyPattern>,
}
