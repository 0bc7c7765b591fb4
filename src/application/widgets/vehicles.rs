// Vehicle distribution (proportional chart)
use super::Synchronizer;
use crate::domain::snapshot::VehicleCount;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize, Default)]
pub struct VehicleDistributionView {
    pub labels: Vec<String>,
    pub counts: Vec<u32>,
    /// Percent of the total, one decimal
    pub shares: Vec<f64>,
}

pub struct VehicleDistribution;

impl Synchronizer for VehicleDistribution {
    type Input = [VehicleCount];
    type View = VehicleDistributionView;

    fn project(&self, input: &[VehicleCount]) -> VehicleDistributionView {
        let total: u64 = input.iter().map(|v| u64::from(v.count)).sum();
        let shares = input
            .iter()
            .map(|v| {
                if total == 0 {
                    0.0
                } else {
                    (v.count as f64 * 1000.0 / total as f64).round() / 10.0
                }
            })
            .collect();

        VehicleDistributionView {
            labels: input.iter().map(|v| v.vehicle.clone()).collect(),
            counts: input.iter().map(|v| v.count).collect(),
            shares,
        }
    }
}
