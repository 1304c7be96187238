//! Monitoring Runtime
//!
//! Wires the analysis crates into the two sides of the system:
//! - The monitored side: a per-subject pipeline fed landmark frames at
//!   capture rate, scored on an independent 1 Hz compute clock
//! - The monitoring side: a hub that folds status messages into the
//!   roster and, on its own 1 Hz report clock, runs the watchdog and the
//!   session aggregator
//!
//! The clocks are independent tokio tasks; stopping a driver ends them
//! with no further alerts or persistence.

pub mod driver;
pub mod hub;
pub mod pipeline;
pub mod settings;

pub use driver::{HubDriver, PipelineDriver};
pub use hub::{MonitorHub, TeachingPeriod};
pub use pipeline::{SubjectPipeline, TickOutcome};
pub use settings::{Settings, SettingsError};

use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
