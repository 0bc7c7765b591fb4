// Map markers: full clear-and-redraw per location fetch
use super::Synchronizer;
use crate::domain::snapshot::{LocationSnapshot, LocationStatus};
use serde::Serialize;

const BASE_RADIUS: f64 = 15.0;
const DENSITY_PER_RADIUS_UNIT: f64 = 5.0;

const HIGH_COLOR: &str = "#f72585";
const MEDIUM_COLOR: &str = "#ff9e00";
const LOW_COLOR: &str = "#4cc9f0";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerView {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub radius: f64,
    pub fill_color: String,
    pub popup: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct MapView {
    pub markers: Vec<MarkerView>,
}

pub fn marker_radius(density: f64) -> f64 {
    BASE_RADIUS + density / DENSITY_PER_RADIUS_UNIT
}

pub fn tier_color(status: LocationStatus) -> &'static str {
    match status {
        LocationStatus::High => HIGH_COLOR,
        LocationStatus::Medium => MEDIUM_COLOR,
        LocationStatus::Low => LOW_COLOR,
    }
}

pub struct MapMarkers;

impl Synchronizer for MapMarkers {
    type Input = [LocationSnapshot];
    type View = MapView;

    fn project(&self, input: &[LocationSnapshot]) -> MapView {
        let markers = input
            .iter()
            .map(|l| MarkerView {
                name: l.name.clone(),
                lat: l.lat,
                lng: l.lng,
                radius: marker_radius(l.density),
                fill_color: tier_color(l.status).to_string(),
                popup: format!(
                    "{}\nDensity: {}%\nStatus: {}\nAnomalies: {}\nReadings: {}",
                    l.name,
                    l.density,
                    l.status.as_str().to_uppercase(),
                    l.anomalies,
                    l.readings
                ),
            })
            .collect();

        MapView { markers }
    }
}
