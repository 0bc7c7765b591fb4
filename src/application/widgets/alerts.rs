// Alert list
use super::{Synchronizer, Tier};
use crate::domain::snapshot::{AlertKind, AlertPriority, AlertRecord};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertItemView {
    pub title: String,
    pub icon: String,
    pub location: String,
    pub value: Option<String>,
    pub time: String,
    pub priority: String,
    pub badge: Tier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AlertListState {
    /// Placeholder shown instead of an empty container
    Empty { message: String },
    Items { alerts: Vec<AlertItemView> },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertsView {
    pub count_label: String,
    pub list: AlertListState,
}

impl Default for AlertsView {
    fn default() -> Self {
        AlertList.project(&[])
    }
}

pub fn alert_title(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::HighDensity => "High Crowd Density",
        AlertKind::Anomaly => "Crowd Anomaly",
        AlertKind::HighCo2 => "High CO₂ Level",
        AlertKind::Other => "Alert",
    }
}

fn alert_icon(kind: AlertKind) -> &'static str {
    match kind {
        AlertKind::HighDensity => "people-fill",
        AlertKind::Anomaly => "exclamation-triangle-fill",
        AlertKind::HighCo2 => "cloud-fill",
        AlertKind::Other => "bell-fill",
    }
}

pub struct AlertList;

impl Synchronizer for AlertList {
    type Input = [AlertRecord];
    type View = AlertsView;

    fn project(&self, input: &[AlertRecord]) -> AlertsView {
        let list = if input.is_empty() {
            AlertListState::Empty {
                message: "No active alerts".to_string(),
            }
        } else {
            AlertListState::Items {
                alerts: input
                    .iter()
                    .map(|a| AlertItemView {
                        title: alert_title(a.kind).to_string(),
                        icon: alert_icon(a.kind).to_string(),
                        location: a.location.clone(),
                        value: a.value.map(|v| format!("Value: {}", v)),
                        time: a.timestamp.format("%H:%M").to_string(),
                        priority: a.priority.as_str().to_string(),
                        badge: match a.priority {
                            AlertPriority::High => Tier::Critical,
                            _ => Tier::Warning,
                        },
                    })
                    .collect(),
            }
        };

        AlertsView {
            count_label: format!("Alerts: {}", input.len()),
            list,
        }
    }
}
