//! Compute-window frame accumulator

/// Per-frame signal counters for one compute window (~1 s).
///
/// `head_down_frames` accrues fractional increments (a tilted posture adds
/// a partial penalty), so all counters are real-valued. Reset to zeros
/// atomically after each compute cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameAccumulator {
    pub head_down_frames: f64,
    pub looking_away_frames: f64,
    pub not_present_frames: f64,
    pub total_frames: f64,
}

impl FrameAccumulator {
    /// Whether any frames arrived in this window.
    pub fn is_empty(&self) -> bool {
        self.total_frames == 0.0
    }

    /// Zero all counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
