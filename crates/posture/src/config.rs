//! Posture classifier configuration

use serde::{Deserialize, Serialize};

/// Posture classifier configuration.
///
/// The two ratio cutoffs are asymmetric band edges: a torso ratio below
/// `standing_ratio_below` reads as standing, one above `sitting_ratio_above`
/// as sitting, and the band between them falls back to absolute nose height.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureConfig {
    /// Minimum shoulder visibility for a classifiable frame
    pub min_confidence: f64,

    /// Torso ratio below this reads as standing
    pub standing_ratio_below: f64,

    /// Torso ratio above this reads as sitting
    pub sitting_ratio_above: f64,

    /// How far a wrist must sit above the nose to count as a raised hand
    /// (normalized units)
    pub hand_raise_margin: f64,

    /// Nose height above this line reads as standing (fallback)
    pub nose_standing_below: f64,

    /// Nose height below this line reads as sitting (fallback)
    pub nose_sitting_above: f64,

    /// Enable the hand-raise rule (independent of posture)
    pub detect_hand_raise: bool,
}

impl Default for PostureConfig {
    fn default() -> Self {
        Self {
            min_confidence: 0.5,
            standing_ratio_below: 0.6,
            sitting_ratio_above: 0.4,
            hand_raise_margin: 0.05,
            nose_standing_below: 0.3,
            nose_sitting_above: 0.4,
            detect_hand_raise: true,
        }
    }
}

impl PostureConfig {
    /// Config with the hand-raise rule switched off.
    pub fn without_hand_raise() -> Self {
        Self {
            detect_hand_raise: false,
            ..Default::default()
        }
    }
}
