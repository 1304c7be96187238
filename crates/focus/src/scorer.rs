//! 1 Hz focus scoring over accumulated frame signals

use crate::accumulator::FrameAccumulator;
use crate::config::FocusConfig;
use crate::snapshot::{FocusLevel, FocusSnapshot, ScorePoint};
use pose_frame::{LandmarkFrame, PoseIndex};
use std::collections::VecDeque;
use tracing::debug;

/// Number of history points carried on an emitted snapshot.
const SNAPSHOT_HISTORY: usize = 30;

/// Accumulates behavioral signals at frame rate and converts them into a
/// 0-100 score once per second.
///
/// `accumulate` must only be fed frames the posture pass judged valid;
/// frames that never arrive are accounted for by the empty-cycle decay and
/// the external forced-away signal.
#[derive(Debug, Clone)]
pub struct FocusScorer {
    config: FocusConfig,
    score: i64,
    head_down: bool,
    looking_away: bool,
    present: bool,
    consecutive_missing: u32,
    accumulator: FrameAccumulator,
    history: VecDeque<ScorePoint>,
}

impl FocusScorer {
    pub fn new(config: FocusConfig) -> Self {
        let history_capacity = config.history_capacity;
        Self {
            config,
            score: 100,
            head_down: false,
            looking_away: false,
            present: true,
            consecutive_missing: 0,
            accumulator: FrameAccumulator::default(),
            history: VecDeque::with_capacity(history_capacity),
        }
    }

    /// Fold one valid landmark frame into the current compute window.
    pub fn accumulate(&mut self, frame: &LandmarkFrame) {
        self.accumulator.total_frames += 1.0;

        let nose = frame.point_or_hidden(PoseIndex::Nose);
        let left_shoulder = frame.point_or_hidden(PoseIndex::LeftShoulder);
        let right_shoulder = frame.point_or_hidden(PoseIndex::RightShoulder);
        let shoulder_center_x = (left_shoulder.x + right_shoulder.x) / 2.0;
        let shoulder_center_y = (left_shoulder.y + right_shoulder.y) / 2.0;

        // Head-down: the nose closes in on the shoulder line.
        let nose_to_shoulder = shoulder_center_y - nose.y;
        if nose_to_shoulder < self.config.head_down_threshold {
            self.accumulator.head_down_frames += 1.0;
            self.head_down = true;
        } else {
            self.head_down = false;
        }

        // Looking-away: any of nose offset, ear visibility imbalance, or
        // eye-level tilt.
        let nose_offset = (nose.x - shoulder_center_x).abs();
        let ear_diff = (frame.visibility(PoseIndex::LeftEar)
            - frame.visibility(PoseIndex::RightEar))
        .abs();
        let eye_level_diff = (frame.point_or_hidden(PoseIndex::LeftEye).y
            - frame.point_or_hidden(PoseIndex::RightEye).y)
            .abs();

        let looking_away = nose_offset > self.config.nose_offset_threshold
            || ear_diff > self.config.ear_diff_threshold
            || eye_level_diff > self.config.eye_level_threshold;
        if looking_away {
            self.accumulator.looking_away_frames += 1.0;
            self.looking_away = true;
        } else {
            self.looking_away = false;
        }

        // Shoulder tilt accrues a partial head-down penalty on top of the
        // head-down test.
        let shoulder_tilt = (left_shoulder.y - right_shoulder.y).abs();
        if shoulder_tilt > self.config.shoulder_tilt_threshold {
            self.accumulator.head_down_frames += self.config.shoulder_tilt_penalty;
        }

        // Presence: a visible nose plus at least one visible eye.
        let face_visible = nose.visibility > 0.5
            && (frame.visibility(PoseIndex::LeftEye) > 0.3
                || frame.visibility(PoseIndex::RightEye) > 0.3);
        if face_visible {
            self.present = true;
        } else {
            self.accumulator.not_present_frames += 1.0;
            self.present = false;
        }
    }

    /// Run one compute cycle. Called once per second, independent of the
    /// frame arrival rate.
    pub fn compute(&mut self, now_ms: u64) -> FocusSnapshot {
        if self.accumulator.is_empty() {
            // No frames this cycle: decay toward zero and mark absent. The
            // accumulator is already empty, nothing else to reset.
            self.score = (self.score - self.config.empty_cycle_decay).max(0);
            self.present = false;
            debug!(score = self.score, "empty compute cycle, decaying score");
            return self.snapshot();
        }

        self.present = true;

        let total = self.accumulator.total_frames;
        let head_score = 100.0 - self.accumulator.head_down_frames / total * 100.0;
        let gaze_score = 100.0 - self.accumulator.looking_away_frames / total * 100.0;

        // Presence hysteresis: transient detection failures are absorbed
        // for a few consecutive cycles before the score reacts.
        let raw_presence_ratio = 1.0 - self.accumulator.not_present_frames / total;
        let presence_score = if raw_presence_ratio < 0.5 {
            self.consecutive_missing += 1;
            debug!(
                consecutive = self.consecutive_missing,
                "face detection failing this cycle"
            );
            if self.consecutive_missing < self.config.presence_grace_cycles {
                self.present = true;
                100.0
            } else {
                self.present = false;
                0.0
            }
        } else {
            self.consecutive_missing = 0;
            self.present = true;
            100.0
        };

        let weighted = head_score * self.config.weight_head
            + gaze_score * self.config.weight_gaze
            + presence_score * self.config.weight_presence;
        self.score = (weighted.round() as i64).clamp(0, 100);

        self.history.push_back(ScorePoint {
            score: self.score as u8,
            timestamp_ms: now_ms,
        });
        while self.history.len() > self.config.history_capacity {
            self.history.pop_front();
        }

        self.accumulator.reset();
        self.snapshot()
    }

    /// External presence-loss signal. Bypasses the weighted formula and
    /// takes precedence whenever raised.
    pub fn force_away(&mut self) -> FocusSnapshot {
        self.score = 0;
        self.present = false;
        self.snapshot()
    }

    /// Current state as an emittable snapshot.
    pub fn snapshot(&self) -> FocusSnapshot {
        let tail = self.history.len().saturating_sub(SNAPSHOT_HISTORY);
        FocusSnapshot {
            score: self.score as u8,
            level: FocusLevel::from_score(self.score as u8),
            head_down: self.head_down,
            looking_away: self.looking_away,
            present: self.present,
            history: self.history.iter().skip(tail).copied().collect(),
        }
    }

    /// Current score.
    pub fn score(&self) -> u8 {
        self.score as u8
    }

    /// Full bounded history, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ScorePoint> {
        self.history.iter()
    }

    /// Accumulator contents for the in-flight compute window.
    pub fn accumulator(&self) -> &FrameAccumulator {
        &self.accumulator
    }
}

impl Default for FocusScorer {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pose_frame::Landmark;
    use proptest::prelude::*;

    fn point(x: f64, y: f64, visibility: f64) -> Landmark {
        Landmark {
            x,
            y,
            z: 0.0,
            visibility,
        }
    }

    /// Upright, front-facing, fully visible subject.
    fn attentive_frame() -> LandmarkFrame {
        let mut points = vec![Landmark::default(); 33];
        points[PoseIndex::Nose.index()] = point(0.5, 0.25, 0.95);
        points[PoseIndex::LeftEye.index()] = point(0.47, 0.22, 0.9);
        points[PoseIndex::RightEye.index()] = point(0.53, 0.22, 0.9);
        points[PoseIndex::LeftEar.index()] = point(0.44, 0.24, 0.8);
        points[PoseIndex::RightEar.index()] = point(0.56, 0.24, 0.8);
        points[PoseIndex::LeftShoulder.index()] = point(0.4, 0.5, 0.9);
        points[PoseIndex::RightShoulder.index()] = point(0.6, 0.5, 0.9);
        LandmarkFrame::new(points, 0)
    }

    /// Subject slumped toward the desk.
    fn head_down_frame() -> LandmarkFrame {
        let mut frame = attentive_frame();
        frame.points[PoseIndex::Nose.index()].y = 0.45;
        frame.points[PoseIndex::LeftEye.index()].y = 0.42;
        frame.points[PoseIndex::RightEye.index()].y = 0.42;
        frame
    }

    /// Face turned away from the camera.
    fn hidden_face_frame() -> LandmarkFrame {
        let mut frame = attentive_frame();
        frame.points[PoseIndex::Nose.index()].visibility = 0.1;
        frame.points[PoseIndex::LeftEye.index()].visibility = 0.1;
        frame.points[PoseIndex::RightEye.index()].visibility = 0.1;
        frame
    }

    #[test]
    fn test_attentive_subject_scores_full() {
        let mut scorer = FocusScorer::default();
        for _ in 0..20 {
            scorer.accumulate(&attentive_frame());
        }
        let snapshot = scorer.compute(1000);
        assert_eq!(snapshot.score, 100);
        assert_eq!(snapshot.level, FocusLevel::High);
        assert!(snapshot.present);
    }

    #[test]
    fn test_head_down_drags_score() {
        let mut scorer = FocusScorer::default();
        for _ in 0..20 {
            scorer.accumulate(&head_down_frame());
        }
        let snapshot = scorer.compute(1000);
        // Head sub-score collapses; gaze and presence hold their weight.
        assert_eq!(snapshot.score, 60);
        assert!(snapshot.head_down);
    }

    #[test]
    fn test_empty_cycle_decays_by_twenty() {
        let mut scorer = FocusScorer::default();
        let snapshot = scorer.compute(1000);
        assert_eq!(snapshot.score, 80);
        assert!(!snapshot.present);

        // Decay floors at zero.
        for tick in 0..10 {
            scorer.compute(2000 + tick);
        }
        assert_eq!(scorer.score(), 0);
    }

    #[test]
    fn test_empty_cycle_does_not_append_history() {
        let mut scorer = FocusScorer::default();
        scorer.compute(1000);
        assert_eq!(scorer.history().count(), 0);
    }

    #[test]
    fn test_presence_grace_period() {
        let mut scorer = FocusScorer::default();

        // Two consecutive low-presence cycles stay inside the grace period.
        for cycle in 0..2 {
            for _ in 0..10 {
                scorer.accumulate(&hidden_face_frame());
            }
            let snapshot = scorer.compute(1000 + cycle);
            assert!(snapshot.present, "cycle {} should be absorbed", cycle);
            assert_eq!(snapshot.score, 100);
        }

        // The third flips presence and zeroes the presence weight.
        for _ in 0..10 {
            scorer.accumulate(&hidden_face_frame());
        }
        let snapshot = scorer.compute(1003);
        assert!(!snapshot.present);
        assert_eq!(snapshot.score, 80);
    }

    #[test]
    fn test_presence_recovery_resets_grace() {
        let mut scorer = FocusScorer::default();

        for _ in 0..10 {
            scorer.accumulate(&hidden_face_frame());
        }
        scorer.compute(1000);

        // A good cycle resets the consecutive-miss counter.
        for _ in 0..10 {
            scorer.accumulate(&attentive_frame());
        }
        assert!(scorer.compute(1001).present);

        // The next bad cycle starts the grace period over.
        for _ in 0..10 {
            scorer.accumulate(&hidden_face_frame());
        }
        let snapshot = scorer.compute(1002);
        assert!(snapshot.present);
        assert_eq!(snapshot.score, 100);
    }

    #[test]
    fn test_force_away_zeroes_immediately() {
        let mut scorer = FocusScorer::default();
        for _ in 0..10 {
            scorer.accumulate(&attentive_frame());
        }
        let snapshot = scorer.force_away();
        assert_eq!(snapshot.score, 0);
        assert!(!snapshot.present);
        assert_eq!(snapshot.level, FocusLevel::VeryLow);
    }

    #[test]
    fn test_history_is_bounded() {
        let config = FocusConfig {
            history_capacity: 5,
            ..Default::default()
        };
        let mut scorer = FocusScorer::new(config);
        for cycle in 0..12u64 {
            scorer.accumulate(&attentive_frame());
            scorer.compute(cycle * 1000);
        }
        assert_eq!(scorer.history().count(), 5);
        // Oldest entries were evicted first.
        assert_eq!(scorer.history().next().unwrap().timestamp_ms, 7000);
    }

    #[test]
    fn test_shoulder_tilt_accrues_partial_penalty() {
        let mut frame = attentive_frame();
        frame.points[PoseIndex::LeftShoulder.index()].y = 0.5;
        frame.points[PoseIndex::RightShoulder.index()].y = 0.58;

        let mut scorer = FocusScorer::default();
        scorer.accumulate(&frame);
        assert!((scorer.accumulator().head_down_frames - 0.3).abs() < 1e-9);
    }

    proptest! {
        /// The emitted score is always an integer in [0,100], whatever the
        /// frame mix looks like.
        #[test]
        fn score_stays_in_bounds(
            cycles in prop::collection::vec(
                (0usize..40, 0usize..40, 0usize..40),
                1..20,
            )
        ) {
            let mut scorer = FocusScorer::default();
            let mut now = 0u64;
            for (attentive, slumped, hidden) in cycles {
                for _ in 0..attentive {
                    scorer.accumulate(&attentive_frame());
                }
                for _ in 0..slumped {
                    scorer.accumulate(&head_down_frame());
                }
                for _ in 0..hidden {
                    scorer.accumulate(&hidden_face_frame());
                }
                now += 1000;
                let snapshot = scorer.compute(now);
                prop_assert!(snapshot.score <= 100);
            }
        }
    }
}
