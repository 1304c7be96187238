//! Landmark-geometry posture classification

use crate::config::PostureConfig;
use pose_frame::{LandmarkFrame, PoseIndex};
use serde::{Deserialize, Serialize};

/// Discrete posture class derived from a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureClass {
    #[default]
    Unknown,
    Standing,
    Sitting,
    HandRaised,
}

/// Classify one landmark frame.
///
/// Pure and total: low-confidence shoulders yield `Unknown`, every other
/// input yields one of the remaining classes. Hand-raise takes priority
/// over the standing/sitting decision when enabled.
pub fn classify(frame: &LandmarkFrame, config: &PostureConfig) -> PostureClass {
    if frame.visibility(PoseIndex::LeftShoulder) < config.min_confidence
        || frame.visibility(PoseIndex::RightShoulder) < config.min_confidence
    {
        return PostureClass::Unknown;
    }

    let nose = frame.point_or_hidden(PoseIndex::Nose);

    if config.detect_hand_raise {
        let left_wrist = frame.point_or_hidden(PoseIndex::LeftWrist);
        let right_wrist = frame.point_or_hidden(PoseIndex::RightWrist);
        let raised = |wrist: &pose_frame::Landmark| {
            wrist.visibility > 0.5 && wrist.y < nose.y - config.hand_raise_margin
        };
        if raised(&left_wrist) || raised(&right_wrist) {
            return PostureClass::HandRaised;
        }
    }

    let shoulder_center_y = frame.center_y(PoseIndex::LeftShoulder, PoseIndex::RightShoulder);
    let hip_center_y = frame.center_y(PoseIndex::LeftHip, PoseIndex::RightHip);
    let knee_center_y = frame.center_y(PoseIndex::LeftKnee, PoseIndex::RightKnee);

    // Standing compresses the torso share of the visible body; sitting
    // folds the knees up and inflates it.
    let torso = hip_center_y - shoulder_center_y;
    let leg = knee_center_y - hip_center_y;
    let extent = torso + leg;

    if extent.abs() > f64::EPSILON {
        let ratio = torso / extent;
        if ratio < config.standing_ratio_below {
            return PostureClass::Standing;
        }
        if ratio > config.sitting_ratio_above {
            return PostureClass::Sitting;
        }
    }

    // Dead zone: decide on absolute nose height, defaulting to sitting.
    if nose.y < config.nose_standing_below {
        PostureClass::Standing
    } else if nose.y > config.nose_sitting_above {
        PostureClass::Sitting
    } else {
        PostureClass::Sitting
    }
}
