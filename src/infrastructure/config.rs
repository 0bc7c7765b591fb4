use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub backend: BackendSettings,
    #[serde(default)]
    pub sync: SyncSettings,
    #[serde(default)]
    pub status: FreshnessThresholds,
    #[serde(default)]
    pub server: ServerSettings,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendSettings {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncSettings {
    pub reconnect_delay_ms: u64,
    pub refresh_interval_secs: u64,
    pub clock_tick_ms: u64,
    pub updating_revert_ms: u64,
    pub raw_history_capacity: usize,
    pub live_chart_capacity: usize,
    pub sparkline_width: usize,
    pub live_window_minutes: u32,
    pub historical_days: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            reconnect_delay_ms: 5000,
            refresh_interval_secs: 60,
            clock_tick_ms: 1000,
            updating_revert_ms: 1000,
            raw_history_capacity: 100,
            live_chart_capacity: 20,
            sparkline_width: 10,
            live_window_minutes: 30,
            historical_days: 30,
        }
    }
}

impl SyncSettings {
    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn updating_revert(&self) -> Duration {
        Duration::from_millis(self.updating_revert_ms)
    }
}

/// Data freshness tiers: below `healthy_below_minutes` is healthy, below
/// `warning_below_minutes` is a warning, anything older is critical.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FreshnessThresholds {
    pub healthy_below_minutes: f64,
    pub warning_below_minutes: f64,
}

impl Default for FreshnessThresholds {
    fn default() -> Self {
        Self {
            healthy_below_minutes: 2.0,
            warning_below_minutes: 5.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Defaults, then `config/dashboard.toml` if present, then `CROWD_SYNC__*`
/// environment variables.
pub fn load_app_config() -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/dashboard").required(false))
        .add_source(
            config::Environment::with_prefix("CROWD_SYNC")
                .prefix_separator("__")
                .separator("__"),
        )
        .build()?;

    let config: AppConfig = settings.try_deserialize()?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    let sync = &config.sync;
    if sync.raw_history_capacity == 0 || sync.live_chart_capacity == 0 || sync.sparkline_width == 0 {
        anyhow::bail!("buffer capacities must be at least 1");
    }
    if sync.live_window_minutes == 0 || sync.historical_days == 0 {
        anyhow::bail!("live window minutes and historical days must be positive");
    }
    if sync.clock_tick_ms == 0 || sync.refresh_interval_secs == 0 {
        anyhow::bail!("timer periods must be positive");
    }
    if config.status.healthy_below_minutes > config.status.warning_below_minutes {
        anyhow::bail!("healthy freshness threshold must not exceed the warning threshold");
    }
    Ok(())
}

/// Join the backend base URL and an endpoint path.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        assert_eq!(
            endpoint_url("http://localhost:5000/", "/api/alerts"),
            "http://localhost:5000/api/alerts"
        );
        assert_eq!(
            endpoint_url("http://localhost:5000", "stream"),
            "http://localhost:5000/stream"
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                "[sync]\nreconnect_delay_ms = 2500\n\n[status]\nwarning_below_minutes = 8.0\n",
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let config: AppConfig = settings.try_deserialize().unwrap();

        assert_eq!(config.sync.reconnect_delay(), Duration::from_millis(2500));
        assert_eq!(config.sync.raw_history_capacity, 100);
        assert_eq!(config.sync.live_chart_capacity, 20);
        assert_eq!(config.status.healthy_below_minutes, 2.0);
        assert_eq!(config.status.warning_below_minutes, 8.0);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut config = AppConfig::default();
        config.sync.live_chart_capacity = 0;
        assert!(validate(&config).is_err());

        let mut config = AppConfig::default();
        config.status.healthy_below_minutes = 9.0;
        assert!(validate(&config).is_err());
    }
}
