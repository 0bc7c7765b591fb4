// Telemetry domain models
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrowdStatus {
    Normal,
    High,
}

impl CrowdStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high" => CrowdStatus::High,
            _ => CrowdStatus::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrafficStatus {
    Normal,
    Busy,
}

impl TrafficStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "busy" => TrafficStatus::Busy,
            _ => TrafficStatus::Normal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarbonStatus {
    Normal,
    High,
}

impl CarbonStatus {
    pub fn from_wire(value: &str) -> Self {
        match value {
            "high" => CarbonStatus::High,
            _ => CarbonStatus::Normal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrowdReading {
    /// Percentage, 0 to 100
    pub density: f64,
    pub status: CrowdStatus,
    pub anomalies: Option<u32>,
    pub readings: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MobilityReading {
    /// Kilograms, never negative
    pub total_co2: f64,
    pub vehicle_types: u32,
    pub trips: Option<u32>,
    pub status: TrafficStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CarbonReading {
    pub level: Option<f64>,
    pub status: CarbonStatus,
}

/// One timestamped observation. Built by the decoder, never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryRecord {
    pub timestamp: NaiveDateTime,
    pub crowd: Option<CrowdReading>,
    pub mobility: Option<MobilityReading>,
    pub carbon: Option<CarbonReading>,
}

impl TelemetryRecord {
    pub fn new(
        timestamp: NaiveDateTime,
        crowd: Option<CrowdReading>,
        mobility: Option<MobilityReading>,
        carbon: Option<CarbonReading>,
    ) -> Self {
        Self {
            timestamp,
            crowd,
            mobility,
            carbon,
        }
    }

    pub fn crowd_density(&self) -> Option<f64> {
        self.crowd.as_ref().map(|c| c.density)
    }

    pub fn total_co2(&self) -> Option<f64> {
        self.mobility.as_ref().map(|m| m.total_co2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_wire_defaults_to_normal() {
        assert_eq!(CrowdStatus::from_wire("high"), CrowdStatus::High);
        assert_eq!(CrowdStatus::from_wire("HIGH"), CrowdStatus::Normal);
        assert_eq!(TrafficStatus::from_wire("busy"), TrafficStatus::Busy);
        assert_eq!(TrafficStatus::from_wire("normal"), TrafficStatus::Normal);
        assert_eq!(CarbonStatus::from_wire("high"), CarbonStatus::High);
        assert_eq!(CarbonStatus::from_wire(""), CarbonStatus::Normal);
    }
}
