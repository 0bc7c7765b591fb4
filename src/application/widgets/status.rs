// System status badges
use super::{Synchronizer, Tier};
use crate::domain::snapshot::{OverallStatus, SystemStatus};
use crate::infrastructure::config::FreshnessThresholds;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusView {
    pub freshness_label: String,
    pub freshness_tier: Tier,
    pub system_label: String,
    pub system_tier: Tier,
}

impl Default for StatusView {
    fn default() -> Self {
        Self {
            freshness_label: "Data: --".to_string(),
            freshness_tier: Tier::Warning,
            system_label: "System: --".to_string(),
            system_tier: Tier::Warning,
        }
    }
}

pub struct StatusBadges {
    thresholds: FreshnessThresholds,
}

impl StatusBadges {
    pub fn new(thresholds: FreshnessThresholds) -> Self {
        Self { thresholds }
    }

    pub fn freshness_tier(&self, freshness_minutes: f64) -> Tier {
        if freshness_minutes < self.thresholds.healthy_below_minutes {
            Tier::Healthy
        } else if freshness_minutes < self.thresholds.warning_below_minutes {
            Tier::Warning
        } else {
            Tier::Critical
        }
    }
}

impl Synchronizer for StatusBadges {
    type Input = SystemStatus;
    type View = StatusView;

    fn project(&self, input: &SystemStatus) -> StatusView {
        let (status_name, system_tier) = match input.overall_status {
            OverallStatus::Healthy => ("healthy", Tier::Healthy),
            OverallStatus::Degraded => ("degraded", Tier::Critical),
        };
        StatusView {
            freshness_label: format!("Data: {} min ago", input.freshness_minutes),
            freshness_tier: self.freshness_tier(input.freshness_minutes),
            system_label: format!("System: {}", status_name),
            system_tier,
        }
    }
}
