//! Focus snapshot and level banding

use serde::{Deserialize, Serialize};

/// Discrete engagement band derived from the score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusLevel {
    High,
    Medium,
    Low,
    VeryLow,
}

impl FocusLevel {
    /// Band for a 0-100 score.
    pub fn from_score(score: u8) -> Self {
        if score >= 80 {
            FocusLevel::High
        } else if score >= 50 {
            FocusLevel::Medium
        } else if score >= 30 {
            FocusLevel::Low
        } else {
            FocusLevel::VeryLow
        }
    }
}

/// One scored compute cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    pub score: u8,
    pub timestamp_ms: u64,
}

/// The scorer's externally visible state after a compute cycle.
///
/// Rides the periodic status message to the monitoring side, so it carries
/// only a short history tail rather than the full bounded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    /// Engagement score, always an integer in [0,100]
    pub score: u8,
    pub level: FocusLevel,
    /// Current-cycle behavioral flags
    pub head_down: bool,
    pub looking_away: bool,
    pub present: bool,
    /// Most recent score points (tail of the bounded history)
    #[serde(default)]
    pub history: Vec<ScorePoint>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_banding() {
        assert_eq!(FocusLevel::from_score(100), FocusLevel::High);
        assert_eq!(FocusLevel::from_score(80), FocusLevel::High);
        assert_eq!(FocusLevel::from_score(79), FocusLevel::Medium);
        assert_eq!(FocusLevel::from_score(50), FocusLevel::Medium);
        assert_eq!(FocusLevel::from_score(49), FocusLevel::Low);
        assert_eq!(FocusLevel::from_score(30), FocusLevel::Low);
        assert_eq!(FocusLevel::from_score(29), FocusLevel::VeryLow);
        assert_eq!(FocusLevel::from_score(0), FocusLevel::VeryLow);
    }
}
