// Domain layer - telemetry and snapshot models, bounded history
pub mod connection;
pub mod history;
pub mod snapshot;
pub mod telemetry;
