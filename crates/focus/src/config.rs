//! Focus scorer configuration

use serde::{Deserialize, Serialize};

/// Focus scorer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Nose-to-shoulder distance below this reads as head-down
    pub head_down_threshold: f64,

    /// Nose horizontal offset from the shoulder center above this reads
    /// as looking away
    pub nose_offset_threshold: f64,

    /// Left/right ear visibility difference above this reads as looking away
    pub ear_diff_threshold: f64,

    /// Left/right eye vertical difference above this reads as looking away
    pub eye_level_threshold: f64,

    /// Shoulder tilt above this accrues a partial head-down increment
    pub shoulder_tilt_threshold: f64,

    /// Partial head-down increment for a tilted posture
    pub shoulder_tilt_penalty: f64,

    /// Sub-score weights (head / gaze / presence)
    pub weight_head: f64,
    pub weight_gaze: f64,
    pub weight_presence: f64,

    /// Score history capacity (one entry per compute cycle)
    pub history_capacity: usize,

    /// Consecutive low-presence cycles absorbed before presence drops
    pub presence_grace_cycles: u32,

    /// Score decay applied on a compute cycle with no frames
    pub empty_cycle_decay: i64,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            head_down_threshold: 0.15,
            nose_offset_threshold: 0.08,
            ear_diff_threshold: 0.2,
            eye_level_threshold: 0.03,
            shoulder_tilt_threshold: 0.04,
            shoulder_tilt_penalty: 0.3,
            weight_head: 0.4,
            weight_gaze: 0.4,
            weight_presence: 0.2,
            history_capacity: 300,
            presence_grace_cycles: 3,
            empty_cycle_decay: 20,
        }
    }
}
