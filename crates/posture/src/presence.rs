//! Presence tracking with dual away-timeout paths

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Presence tracker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// Consecutive low-confidence frames tolerated before away
    pub max_missed_frames: u32,

    /// Milliseconds without a good detection before away (wall-clock path)
    pub detection_timeout_ms: u64,

    /// Milliseconds after start() before the wall-clock path arms
    pub warmup_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            max_missed_frames: 30,
            detection_timeout_ms: 3000,
            warmup_ms: 5000,
        }
    }
}

/// Tracks detection failures and raises an away signal on timeout.
///
/// Two independent paths can raise away: a consecutive-miss frame counter
/// fed at capture rate, and a wall-clock check polled once per second.
/// Raising away while already away is a no-op; a good frame clears it.
#[derive(Debug, Clone)]
pub struct PresenceTracker {
    config: PresenceConfig,
    started_at_ms: Option<u64>,
    last_detection_ms: u64,
    consecutive_misses: u32,
    away: bool,
}

impl PresenceTracker {
    pub fn new(config: PresenceConfig) -> Self {
        Self {
            config,
            started_at_ms: None,
            last_detection_ms: 0,
            consecutive_misses: 0,
            away: false,
        }
    }

    /// Arm the tracker. The wall-clock path stays silent through the
    /// warm-up window so a slow camera start is not read as away.
    pub fn start(&mut self, now_ms: u64) {
        self.started_at_ms = Some(now_ms);
        self.last_detection_ms = now_ms;
        self.consecutive_misses = 0;
        self.away = false;
    }

    /// Record one frame. `detected` reflects core-landmark visibility.
    ///
    /// Returns `true` when this frame newly raised the away signal.
    pub fn observe_frame(&mut self, detected: bool, now_ms: u64) -> bool {
        if detected {
            self.consecutive_misses = 0;
            self.last_detection_ms = now_ms;
            if self.away {
                debug!("subject detected again, clearing away");
                self.away = false;
            }
            return false;
        }

        self.consecutive_misses += 1;
        if self.consecutive_misses > self.config.max_missed_frames {
            return self.raise_away("frame-count");
        }
        false
    }

    /// Wall-clock check, polled once per second.
    ///
    /// Returns `true` when this poll newly raised the away signal.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        let Some(started_at) = self.started_at_ms else {
            return false;
        };
        if now_ms.saturating_sub(started_at) < self.config.warmup_ms {
            return false;
        }
        if now_ms.saturating_sub(self.last_detection_ms) > self.config.detection_timeout_ms {
            return self.raise_away("wall-clock");
        }
        false
    }

    fn raise_away(&mut self, path: &str) -> bool {
        if self.away {
            return false;
        }
        debug!(path, "presence lost, raising away");
        self.away = true;
        true
    }

    pub fn is_away(&self) -> bool {
        self.away
    }

    pub fn last_detection_ms(&self) -> u64 {
        self.last_detection_ms
    }

    /// Drop all counters and the away flag.
    pub fn reset(&mut self) {
        self.started_at_ms = None;
        self.last_detection_ms = 0;
        self.consecutive_misses = 0;
        self.away = false;
    }
}

impl Default for PresenceTracker {
    fn default() -> Self {
        Self::new(PresenceConfig::default())
    }
}
