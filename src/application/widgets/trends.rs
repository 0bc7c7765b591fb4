// Daily and historical trend charts
use super::Synchronizer;
use crate::domain::snapshot::{DailyTrends, HistoricalAnalysis};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct DailyTrendView {
    pub labels: Vec<String>,
    pub density: Vec<f64>,
}

pub struct DailyTrendChart;

impl Synchronizer for DailyTrendChart {
    type Input = DailyTrends;
    type View = DailyTrendView;

    fn project(&self, input: &DailyTrends) -> DailyTrendView {
        DailyTrendView {
            labels: input
                .crowd_trends
                .iter()
                .map(|t| format!("{}:00", t.hour))
                .collect(),
            density: input.crowd_trends.iter().map(|t| t.density).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct HistoricalTrendView {
    pub labels: Vec<String>,
    pub crowd_density: Vec<f64>,
    pub co2_level: Vec<f64>,
    pub vehicle_diversity: Vec<Option<u32>>,
    pub hourly_labels: Vec<String>,
    pub hourly_density: Vec<f64>,
    pub hourly_co2: Vec<f64>,
}

/// `2024-05-01` becomes `05-01`.
fn strip_year(date: &str) -> String {
    date.get(5..)
        .filter(|rest| !rest.is_empty())
        .unwrap_or(date)
        .to_string()
}

pub struct HistoricalTrendChart;

impl Synchronizer for HistoricalTrendChart {
    type Input = HistoricalAnalysis;
    type View = HistoricalTrendView;

    fn project(&self, input: &HistoricalAnalysis) -> HistoricalTrendView {
        let days = &input.daily_trends;
        let hours = &input.hourly_patterns;
        HistoricalTrendView {
            labels: days.iter().map(|d| strip_year(&d.date)).collect(),
            crowd_density: days.iter().map(|d| d.crowd_density).collect(),
            co2_level: days.iter().map(|d| d.co2_level).collect(),
            vehicle_diversity: days.iter().map(|d| d.vehicle_diversity).collect(),
            hourly_labels: hours.iter().map(|h| format!("{}:00", h.hour)).collect(),
            hourly_density: hours.iter().map(|h| h.crowd_density).collect(),
            hourly_co2: hours.iter().map(|h| h.co2_level).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::snapshot::{DailyTrend, HourlyDensity, HourlyPattern};

    #[test]
    fn test_daily_labels() {
        let trends = DailyTrends {
            crowd_trends: vec![
                HourlyDensity {
                    hour: 0,
                    density: 35.5,
                },
                HourlyDensity {
                    hour: 17,
                    density: 71.0,
                },
            ],
        };
        let view = DailyTrendChart.project(&trends);
        assert_eq!(view.labels, vec!["0:00", "17:00"]);
        assert_eq!(view.density, vec![35.5, 71.0]);
    }

    #[test]
    fn test_historical_labels_drop_year() {
        let analysis = HistoricalAnalysis {
            daily_trends: vec![DailyTrend {
                date: "2024-04-30".to_string(),
                crowd_density: 52.0,
                co2_level: 441.0,
                vehicle_diversity: Some(5),
            }],
            hourly_patterns: vec![HourlyPattern {
                hour: 9,
                crowd_density: 64.0,
                co2_level: 18.5,
            }],
        };
        let view = HistoricalTrendChart.project(&analysis);
        assert_eq!(view.labels, vec!["04-30"]);
        assert_eq!(view.hourly_labels, vec!["9:00"]);
        assert_eq!(view.hourly_co2, vec![18.5]);
        assert_eq!(view.co2_level, vec![441.0]);
        assert_eq!(view.vehicle_diversity, vec![Some(5)]);
        assert_eq!(strip_year("bad"), "bad");
    }
}
