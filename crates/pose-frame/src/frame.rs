//! Landmark frame type and geometry helpers

use crate::index::PoseIndex;
use serde::{Deserialize, Serialize};

/// A single anatomical point in normalized image coordinates.
///
/// `x`/`y` are in [0,1] with the origin at the top-left, so a smaller `y`
/// is higher in the image. `visibility` is the model's confidence in [0,1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    pub visibility: f64,
}

/// One frame of body landmarks, produced externally and consumed once.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Points addressed by the fixed index table.
    pub points: Vec<Landmark>,
    /// Capture timestamp (milliseconds since the epoch).
    pub timestamp_ms: u64,
}

impl LandmarkFrame {
    /// Create a frame from raw points.
    pub fn new(points: Vec<Landmark>, timestamp_ms: u64) -> Self {
        Self {
            points,
            timestamp_ms,
        }
    }

    /// Get a landmark by anatomical index.
    pub fn get(&self, index: PoseIndex) -> Option<&Landmark> {
        self.points.get(index.index())
    }

    /// Get a landmark by index, treating an absent point as fully hidden.
    ///
    /// A zero-visibility landmark behaves identically to a missing one in
    /// every downstream test, so callers never need to branch on absence.
    pub fn point_or_hidden(&self, index: PoseIndex) -> Landmark {
        self.get(index).copied().unwrap_or_default()
    }

    /// Visibility of a landmark, 0.0 when absent.
    pub fn visibility(&self, index: PoseIndex) -> f64 {
        self.point_or_hidden(index).visibility
    }

    /// Midpoint x of two landmarks.
    pub fn center_x(&self, a: PoseIndex, b: PoseIndex) -> f64 {
        (self.point_or_hidden(a).x + self.point_or_hidden(b).x) / 2.0
    }

    /// Midpoint y of two landmarks.
    pub fn center_y(&self, a: PoseIndex, b: PoseIndex) -> f64 {
        (self.point_or_hidden(a).y + self.point_or_hidden(b).y) / 2.0
    }

    /// Whether the core landmarks (nose and both shoulders) clear the
    /// given visibility threshold. Frames failing this check feed the
    /// presence-miss counters instead of the analyzers.
    pub fn has_core_visibility(&self, threshold: f64) -> bool {
        self.visibility(PoseIndex::Nose) > threshold
            && self.visibility(PoseIndex::LeftShoulder) > threshold
            && self.visibility(PoseIndex::RightShoulder) > threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame_with(points: &[(PoseIndex, f64, f64, f64)]) -> LandmarkFrame {
        let mut landmarks = vec![Landmark::default(); 33];
        for &(index, x, y, visibility) in points {
            landmarks[index.index()] = Landmark {
                x,
                y,
                z: 0.0,
                visibility,
            };
        }
        LandmarkFrame::new(landmarks, 0)
    }

    #[test]
    fn test_missing_point_is_hidden() {
        let frame = LandmarkFrame::new(Vec::new(), 0);
        let nose = frame.point_or_hidden(PoseIndex::Nose);
        assert_eq!(nose.visibility, 0.0);
        assert!(frame.get(PoseIndex::Nose).is_none());
    }

    #[test]
    fn test_center_helpers() {
        let frame = frame_with(&[
            (PoseIndex::LeftShoulder, 0.4, 0.5, 0.9),
            (PoseIndex::RightShoulder, 0.6, 0.7, 0.9),
        ]);
        assert!((frame.center_x(PoseIndex::LeftShoulder, PoseIndex::RightShoulder) - 0.5).abs() < 1e-9);
        assert!((frame.center_y(PoseIndex::LeftShoulder, PoseIndex::RightShoulder) - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_core_visibility() {
        let visible = frame_with(&[
            (PoseIndex::Nose, 0.5, 0.3, 0.9),
            (PoseIndex::LeftShoulder, 0.4, 0.5, 0.8),
            (PoseIndex::RightShoulder, 0.6, 0.5, 0.8),
        ]);
        assert!(visible.has_core_visibility(0.5));

        let occluded = frame_with(&[
            (PoseIndex::Nose, 0.5, 0.3, 0.9),
            (PoseIndex::LeftShoulder, 0.4, 0.5, 0.2),
            (PoseIndex::RightShoulder, 0.6, 0.5, 0.8),
        ]);
        assert!(!occluded.has_core_visibility(0.5));
    }
}
