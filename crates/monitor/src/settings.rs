//! Settings loading

use config::{Config, ConfigError, Environment, File};
use focus::FocusConfig;
use posture::{PostureConfig, PresenceConfig};
use roster::{RosterConfig, DEFAULT_STATUS_INTERVAL_MS};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Settings error types
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Pipeline settings, assembled from the per-component configs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Interval between status pushes to the monitoring side (ms)
    pub status_interval_ms: u64,

    /// Focus compute clock period (ms)
    pub compute_tick_ms: u64,

    /// Monitoring-side report/watchdog clock period (ms)
    pub report_tick_ms: u64,

    /// Bind address for the report API
    pub api_addr: String,

    pub posture: PostureConfig,
    pub presence: PresenceConfig,
    pub focus: FocusConfig,
    pub roster: RosterConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            status_interval_ms: DEFAULT_STATUS_INTERVAL_MS,
            compute_tick_ms: 1000,
            report_tick_ms: 1000,
            api_addr: "127.0.0.1:8080".to_string(),
            posture: PostureConfig::default(),
            presence: PresenceConfig::default(),
            focus: FocusConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from an optional `classsight` config file plus
    /// `CLASSSIGHT_`-prefixed environment overrides
    /// (e.g. `CLASSSIGHT_POSTURE__MIN_CONFIDENCE=0.6`).
    pub fn load() -> Result<Self, SettingsError> {
        let config = Config::builder()
            .add_source(File::with_name("classsight").required(false))
            .add_source(Environment::with_prefix("CLASSSIGHT").separator("__"))
            .build()?;
        let settings: Settings = config.try_deserialize()?;
        info!(
            status_interval_ms = settings.status_interval_ms,
            api_addr = %settings.api_addr,
            "settings loaded"
        );
        Ok(settings)
    }
}
