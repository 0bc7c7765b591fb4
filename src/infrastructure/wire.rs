// Mapper from backend JSON payloads to domain models
use crate::domain::snapshot::{
    AlertKind, AlertPriority, AlertRecord, CrowdGraphPoint, DailyTrend, DailyTrends,
    HistoricalAnalysis, HourlyDensity, HourlyPattern, LiveGraph, LocationSnapshot,
    LocationStatus, OverallStatus, SystemStatus, VehicleCount,
};
use crate::domain::telemetry::{
    CarbonReading, CarbonStatus, CrowdReading, CrowdStatus, MobilityReading, TelemetryRecord,
    TrafficStatus,
};
use crate::error::{SyncError, SyncResult};
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use std::collections::HashSet;

// Summary thresholds used by the backend's realtime-metrics endpoint
const HIGH_DENSITY_PERCENT: f64 = 70.0;
const BUSY_CO2_KG: f64 = 30.0;

#[derive(Debug, Deserialize)]
pub struct WireTelemetry {
    pub timestamp: String,
    #[serde(default)]
    pub crowd: Option<WireCrowd>,
    #[serde(default)]
    pub mobility: Option<WireMobility>,
    #[serde(default)]
    pub carbon: Option<WireCarbon>,
}

/// The stream endpoint sends raw samples, the metrics endpoint a summary.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireCrowd {
    Summary {
        density: f64,
        status: String,
        #[serde(default)]
        anomalies: Option<u32>,
        #[serde(default)]
        readings: Option<u32>,
    },
    Samples(Vec<WireCrowdSample>),
}

#[derive(Debug, Deserialize)]
pub struct WireCrowdSample {
    #[allow(dead_code)]
    #[serde(default)]
    pub location: Option<String>,
    /// Fraction, 0 to 1
    pub density: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WireMobility {
    Summary {
        total_co2: f64,
        vehicle_types: u32,
        status: String,
        #[serde(default)]
        trips: Option<u32>,
    },
    Samples(Vec<WireMobilitySample>),
}

#[derive(Debug, Deserialize)]
pub struct WireMobilitySample {
    pub vehicle_type: String,
    pub co2_emission: f64,
}

#[derive(Debug, Deserialize)]
pub struct WireCarbon {
    #[serde(default)]
    pub level: Option<f64>,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct WireLocation {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub density: f64,
    pub status: String,
    #[serde(default)]
    pub anomalies: u32,
    #[serde(default)]
    pub readings: u32,
}

#[derive(Debug, Deserialize)]
pub struct WireAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub priority: String,
    pub location: String,
    #[serde(default)]
    pub value: Option<f64>,
    pub timestamp: String,
}

#[derive(Debug, Deserialize)]
pub struct WireSystemStatus {
    pub database: WireDatabaseStatus,
    pub overall_status: String,
}

#[derive(Debug, Deserialize)]
pub struct WireDatabaseStatus {
    #[serde(default)]
    pub freshness_minutes: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct WireLiveGraph {
    #[serde(default)]
    pub crowd_graph: Vec<WireCrowdPoint>,
    #[serde(default)]
    pub co2_graph: Vec<WireCo2Point>,
    #[serde(default)]
    pub vehicle_distribution: Vec<WireVehicleCount>,
}

#[derive(Debug, Deserialize)]
pub struct WireCrowdPoint {
    pub time: String,
    pub density: f64,
}

#[derive(Debug, Deserialize)]
pub struct WireCo2Point {
    pub co2: f64,
}

#[derive(Debug, Deserialize)]
pub struct WireVehicleCount {
    pub vehicle: String,
    pub count: u32,
}

#[derive(Debug, Deserialize)]
pub struct WireDailyTrends {
    #[serde(default)]
    pub crowd_trends: Vec<WireHourlyDensity>,
}

#[derive(Debug, Deserialize)]
pub struct WireHourlyDensity {
    pub hour: u8,
    pub density: f64,
}

#[derive(Debug, Deserialize)]
pub struct WireHistorical {
    #[serde(default)]
    pub daily_trends: Vec<WireDailyTrend>,
    #[serde(default)]
    pub hourly_patterns: Vec<WireHourlyPattern>,
}

#[derive(Debug, Deserialize)]
pub struct WireDailyTrend {
    pub date: String,
    pub crowd_density: f64,
    pub co2_level: f64,
    #[serde(default)]
    pub vehicle_diversity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct WireHourlyPattern {
    pub hour: u8,
    pub crowd_density: f64,
    pub co2_level: f64,
}

/// Accepts RFC 3339 or the naive ISO-8601 form Python's `isoformat()` emits.
pub fn parse_timestamp(value: &str) -> SyncResult<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.naive_local());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| SyncError::Decode(format!("bad timestamp {:?}: {}", value, e)))
}

fn round_to(value: f64, digits: i32) -> f64 {
    let factor = 10f64.powi(digits);
    (value * factor).round() / factor
}

fn crowd_to_domain(crowd: WireCrowd) -> SyncResult<Option<CrowdReading>> {
    let reading = match crowd {
        WireCrowd::Summary {
            density,
            status,
            anomalies,
            readings,
        } => CrowdReading {
            density,
            status: CrowdStatus::from_wire(&status),
            anomalies,
            readings,
        },
        WireCrowd::Samples(samples) => {
            if samples.is_empty() {
                return Ok(None);
            }
            let mean = samples.iter().map(|s| s.density).sum::<f64>() / samples.len() as f64;
            let density = round_to(mean * 100.0, 1);
            CrowdReading {
                density,
                status: if density > HIGH_DENSITY_PERCENT {
                    CrowdStatus::High
                } else {
                    CrowdStatus::Normal
                },
                anomalies: None,
                readings: Some(samples.len() as u32),
            }
        }
    };

    if !reading.density.is_finite() || !(0.0..=100.0).contains(&reading.density) {
        return Err(SyncError::Decode(format!(
            "crowd density {} outside 0-100",
            reading.density
        )));
    }
    Ok(Some(reading))
}

fn mobility_to_domain(mobility: WireMobility) -> SyncResult<Option<MobilityReading>> {
    let reading = match mobility {
        WireMobility::Summary {
            total_co2,
            vehicle_types,
            status,
            trips,
        } => MobilityReading {
            total_co2,
            vehicle_types,
            trips,
            status: TrafficStatus::from_wire(&status),
        },
        WireMobility::Samples(samples) => {
            if samples.is_empty() {
                return Ok(None);
            }
            let total_co2 = round_to(samples.iter().map(|s| s.co2_emission).sum(), 2);
            let vehicle_types = samples
                .iter()
                .map(|s| s.vehicle_type.as_str())
                .collect::<HashSet<_>>()
                .len() as u32;
            MobilityReading {
                total_co2,
                vehicle_types,
                trips: Some(samples.len() as u32),
                status: if total_co2 > BUSY_CO2_KG {
                    TrafficStatus::Busy
                } else {
                    TrafficStatus::Normal
                },
            }
        }
    };

    if !reading.total_co2.is_finite() || reading.total_co2 < 0.0 {
        return Err(SyncError::Decode(format!(
            "total co2 {} must be a non-negative number",
            reading.total_co2
        )));
    }
    Ok(Some(reading))
}

pub fn telemetry_to_domain(wire: WireTelemetry) -> SyncResult<TelemetryRecord> {
    let timestamp = parse_timestamp(&wire.timestamp)?;
    let crowd = match wire.crowd {
        Some(c) => crowd_to_domain(c)?,
        None => None,
    };
    let mobility = match wire.mobility {
        Some(m) => mobility_to_domain(m)?,
        None => None,
    };
    let carbon = wire.carbon.map(|c| CarbonReading {
        level: c.level,
        status: CarbonStatus::from_wire(&c.status),
    });

    Ok(TelemetryRecord::new(timestamp, crowd, mobility, carbon))
}

/// Decode one JSON-encoded telemetry event.
pub fn decode_telemetry(payload: &str) -> SyncResult<TelemetryRecord> {
    let wire: WireTelemetry = serde_json::from_str(payload)?;
    telemetry_to_domain(wire)
}

pub fn locations_to_domain(wire: Vec<WireLocation>) -> Vec<LocationSnapshot> {
    wire.into_iter()
        .map(|l| LocationSnapshot {
            name: l.name,
            lat: l.lat,
            lng: l.lng,
            density: l.density,
            status: LocationStatus::from_wire(&l.status),
            anomalies: l.anomalies,
            readings: l.readings,
        })
        .collect()
}

pub fn alerts_to_domain(wire: Vec<WireAlert>) -> SyncResult<Vec<AlertRecord>> {
    wire.into_iter()
        .map(|a| {
            Ok(AlertRecord {
                kind: AlertKind::from_wire(&a.kind),
                priority: AlertPriority::from_wire(&a.priority),
                location: a.location,
                value: a.value,
                timestamp: parse_timestamp(&a.timestamp)?,
            })
        })
        .collect()
}

pub fn system_status_to_domain(wire: WireSystemStatus) -> SyncResult<SystemStatus> {
    let freshness_minutes = wire.database.freshness_minutes.unwrap_or(0.0);
    if !freshness_minutes.is_finite() || freshness_minutes < 0.0 {
        return Err(SyncError::Decode(format!(
            "freshness {} must be a non-negative number",
            freshness_minutes
        )));
    }
    let overall_status = match wire.overall_status.as_str() {
        "healthy" => OverallStatus::Healthy,
        _ => OverallStatus::Degraded,
    };
    Ok(SystemStatus {
        overall_status,
        freshness_minutes,
    })
}

pub fn live_graph_to_domain(wire: WireLiveGraph) -> LiveGraph {
    LiveGraph {
        crowd_graph: wire
            .crowd_graph
            .into_iter()
            .map(|p| CrowdGraphPoint {
                time: p.time,
                density: p.density,
            })
            .collect(),
        co2_graph: wire.co2_graph.into_iter().map(|p| p.co2).collect(),
        vehicle_distribution: wire
            .vehicle_distribution
            .into_iter()
            .map(|v| VehicleCount {
                vehicle: v.vehicle,
                count: v.count,
            })
            .collect(),
    }
}

pub fn daily_trends_to_domain(wire: WireDailyTrends) -> DailyTrends {
    DailyTrends {
        crowd_trends: wire
            .crowd_trends
            .into_iter()
            .map(|t| HourlyDensity {
                hour: t.hour,
                density: t.density,
            })
            .collect(),
    }
}

pub fn historical_to_domain(wire: WireHistorical) -> HistoricalAnalysis {
    HistoricalAnalysis {
        daily_trends: wire
            .daily_trends
            .into_iter()
            .map(|d| DailyTrend {
                date: d.date,
                crowd_density: d.crowd_density,
                co2_level: d.co2_level,
                vehicle_diversity: d.vehicle_diversity,
            })
            .collect(),
        hourly_patterns: wire
            .hourly_patterns
            .into_iter()
            .map(|h| HourlyPattern {
                hour: h.hour,
                crowd_density: h.crowd_density,
                co2_level: h.co2_level,
            })
            .collect(),
    }
}
