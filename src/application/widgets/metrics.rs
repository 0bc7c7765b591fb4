// Metric cards: crowd, emissions, traffic and sustainability score
use super::{Synchronizer, Tier};
use crate::domain::telemetry::{
    CarbonReading, CarbonStatus, CrowdReading, CrowdStatus, MobilityReading, TelemetryRecord,
    TrafficStatus,
};
use serde::Serialize;

const BASE_SCORE: i32 = 80;
const SCORE_PENALTY: i32 = 10;

/// Latest reading of each kind; a record without one keeps the previous.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsInput {
    pub crowd: Option<CrowdReading>,
    pub mobility: Option<MobilityReading>,
    pub carbon: Option<CarbonReading>,
    /// Score of the latest record that carried a carbon reading
    pub sustainability: Option<u8>,
}

impl MetricsInput {
    pub fn ingest(&mut self, record: &TelemetryRecord) {
        if let Some(crowd) = &record.crowd {
            self.crowd = Some(crowd.clone());
        }
        if let Some(mobility) = &record.mobility {
            self.mobility = Some(mobility.clone());
        }
        if let Some(carbon) = &record.carbon {
            self.carbon = Some(carbon.clone());
            self.sustainability = Some(sustainability_score(record));
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusText {
    pub text: String,
    pub tier: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MetricsView {
    pub crowd_density: Option<String>,
    pub crowd_status: Option<StatusText>,
    pub crowd_anomalies: Option<u32>,
    pub sensor_readings: Option<u32>,
    pub co2_emissions: Option<String>,
    pub co2_status: Option<StatusText>,
    pub active_vehicles: Option<u32>,
    pub trips: Option<u32>,
    pub traffic_status: Option<String>,
    pub carbon_level: Option<String>,
    pub sustainability_score: Option<u8>,
}

/// 80 minus 10 for each stress flag set on this record alone.
pub fn sustainability_score(record: &TelemetryRecord) -> u8 {
    let mut score = BASE_SCORE;
    if matches!(&record.crowd, Some(c) if c.status == CrowdStatus::High) {
        score -= SCORE_PENALTY;
    }
    if matches!(&record.mobility, Some(m) if m.status == TrafficStatus::Busy) {
        score -= SCORE_PENALTY;
    }
    if matches!(&record.carbon, Some(c) if c.status == CarbonStatus::High) {
        score -= SCORE_PENALTY;
    }
    score.clamp(0, 100) as u8
}

fn status_text(stressed: bool) -> StatusText {
    if stressed {
        StatusText {
            text: "High".to_string(),
            tier: Tier::Critical,
        }
    } else {
        StatusText {
            text: "Normal".to_string(),
            tier: Tier::Healthy,
        }
    }
}

pub struct MetricCards;

impl Synchronizer for MetricCards {
    type Input = MetricsInput;
    type View = MetricsView;

    fn project(&self, input: &MetricsInput) -> MetricsView {
        let crowd = input.crowd.as_ref();
        let mobility = input.mobility.as_ref();
        let busy = mobility.map(|m| m.status == TrafficStatus::Busy);

        MetricsView {
            crowd_density: crowd.map(|c| format!("{}%", c.density)),
            crowd_status: crowd.map(|c| status_text(c.status == CrowdStatus::High)),
            crowd_anomalies: crowd.and_then(|c| c.anomalies),
            sensor_readings: crowd.and_then(|c| c.readings),
            co2_emissions: mobility.map(|m| format!("{} kg", m.total_co2)),
            co2_status: busy.map(status_text),
            active_vehicles: mobility.map(|m| m.vehicle_types),
            trips: mobility.and_then(|m| m.trips),
            traffic_status: busy.map(|busy| if busy { "Busy" } else { "Normal" }.to_string()),
            carbon_level: input
                .carbon
                .as_ref()
                .and_then(|c| c.level)
                .map(|level| format!("{:.1} ppm", level)),
            sustainability_score: input.sustainability,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn crowd(status: CrowdStatus) -> CrowdReading {
        CrowdReading {
            density: 87.0,
            status,
            anomalies: Some(2),
            readings: Some(40),
        }
    }

    fn mobility(status: TrafficStatus) -> MobilityReading {
        MobilityReading {
            total_co2: 12.3,
            vehicle_types: 4,
            trips: Some(118),
            status,
        }
    }

    fn carbon(status: CarbonStatus) -> CarbonReading {
        CarbonReading {
            level: Some(510.0),
            status,
        }
    }

    fn record(
        crowd: Option<CrowdReading>,
        mobility: Option<MobilityReading>,
        carbon: Option<CarbonReading>,
    ) -> TelemetryRecord {
        let timestamp = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        TelemetryRecord::new(timestamp, crowd, mobility, carbon)
    }

    #[test]
    fn test_cards_from_full_record() {
        let mut input = MetricsInput::default();
        input.ingest(&record(
            Some(crowd(CrowdStatus::High)),
            Some(mobility(TrafficStatus::Busy)),
            Some(carbon(CarbonStatus::High)),
        ));
        let view = MetricCards.project(&input);
        assert_eq!(view.crowd_density.as_deref(), Some("87%"));
        assert_eq!(view.crowd_status.unwrap().tier, Tier::Critical);
        assert_eq!(view.crowd_anomalies, Some(2));
        assert_eq!(view.sensor_readings, Some(40));
        assert_eq!(view.co2_emissions.as_deref(), Some("12.3 kg"));
        assert_eq!(view.co2_status.unwrap().text, "High");
        assert_eq!(view.active_vehicles, Some(4));
        assert_eq!(view.trips, Some(118));
        assert_eq!(view.traffic_status.as_deref(), Some("Busy"));
        assert_eq!(view.carbon_level.as_deref(), Some("510.0 ppm"));
        assert_eq!(view.sustainability_score, Some(50));
    }

    #[test]
    fn test_missing_readings_leave_cards_empty() {
        let mut input = MetricsInput::default();
        input.ingest(&record(Some(crowd(CrowdStatus::Normal)), None, None));
        let view = MetricCards.project(&input);
        assert_eq!(view.crowd_status.unwrap().text, "Normal");
        assert!(view.co2_emissions.is_none());
        assert!(view.trips.is_none());
        assert!(view.carbon_level.is_none());
        assert!(view.sustainability_score.is_none());
    }

    #[test]
    fn test_score_uses_only_the_carbon_record() {
        let mut input = MetricsInput::default();
        input.ingest(&record(
            Some(crowd(CrowdStatus::High)),
            Some(mobility(TrafficStatus::Busy)),
            None,
        ));
        assert_eq!(input.sustainability, None);

        input.ingest(&record(None, None, Some(carbon(CarbonStatus::Normal))));
        assert_eq!(input.sustainability, Some(80));

        // Without a carbon reading the previous score stays
        input.ingest(&record(Some(crowd(CrowdStatus::High)), None, None));
        assert_eq!(MetricCards.project(&input).sustainability_score, Some(80));

        input.ingest(&record(
            Some(crowd(CrowdStatus::High)),
            None,
            Some(carbon(CarbonStatus::High)),
        ));
        assert_eq!(input.sustainability, Some(60));
    }
}
