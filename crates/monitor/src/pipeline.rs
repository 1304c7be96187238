//! Subject-side analysis pipeline

use focus::{FocusConfig, FocusScorer, FocusSnapshot};
use pose_frame::LandmarkFrame;
use posture::{classify, PostureClass, PostureConfig, PresenceConfig, PresenceTracker};
use roster::SubjectStatus;
use tracing::debug;

/// Result of one compute-clock tick.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub snapshot: FocusSnapshot,
    pub status: SubjectStatus,
    /// Set when this tick itself changed the status (wall-clock away)
    pub status_change: Option<SubjectStatus>,
}

/// One monitored subject's local analysis state.
///
/// `ingest_frame` runs at frame arrival rate and never waits on the
/// compute clock; `compute_tick` runs at 1 Hz. The two communicate only
/// through the scorer's frame accumulator.
pub struct SubjectPipeline {
    posture_config: PostureConfig,
    focus_config: FocusConfig,
    presence: PresenceTracker,
    scorer: FocusScorer,
    status: SubjectStatus,
}

impl SubjectPipeline {
    pub fn new(
        posture_config: PostureConfig,
        presence_config: PresenceConfig,
        focus_config: FocusConfig,
    ) -> Self {
        Self {
            posture_config,
            focus_config: focus_config.clone(),
            presence: PresenceTracker::new(presence_config),
            scorer: FocusScorer::new(focus_config),
            status: SubjectStatus::Unknown,
        }
    }

    /// Arm the presence tracker at monitoring start.
    pub fn start(&mut self, now_ms: u64) {
        self.presence.start(now_ms);
    }

    /// Process one landmark frame.
    ///
    /// Returns the new status when this frame changed it; `Unknown`
    /// results never displace a known status.
    pub fn ingest_frame(&mut self, frame: &LandmarkFrame, now_ms: u64) -> Option<SubjectStatus> {
        let frame_ok = frame.has_core_visibility(self.posture_config.min_confidence);
        self.presence.observe_frame(frame_ok, now_ms);

        let mut current = SubjectStatus::Unknown;
        if frame_ok {
            current = match classify(frame, &self.posture_config) {
                PostureClass::Unknown => SubjectStatus::Unknown,
                PostureClass::Standing => SubjectStatus::Standing,
                PostureClass::Sitting => SubjectStatus::Sitting,
                PostureClass::HandRaised => SubjectStatus::HandRaised,
            };
            self.scorer.accumulate(frame);
        }

        if self.presence.is_away() {
            current = SubjectStatus::Away;
            self.scorer.force_away();
        }

        if current != SubjectStatus::Unknown && current != self.status {
            debug!(from = ?self.status, to = ?current, "status changed");
            self.status = current;
            return Some(current);
        }
        None
    }

    /// Run one compute-clock tick: poll the wall-clock presence path,
    /// then score the window.
    pub fn compute_tick(&mut self, now_ms: u64) -> TickOutcome {
        self.presence.poll(now_ms);

        let mut status_change = None;
        let snapshot = if self.presence.is_away() {
            if self.status != SubjectStatus::Away {
                debug!(from = ?self.status, "presence timeout, forcing away");
                self.status = SubjectStatus::Away;
                status_change = Some(SubjectStatus::Away);
            }
            self.scorer.force_away()
        } else {
            self.scorer.compute(now_ms)
        };

        TickOutcome {
            snapshot,
            status: self.status,
            status_change,
        }
    }

    pub fn status(&self) -> SubjectStatus {
        self.status
    }

    /// Current focus state without advancing the clock.
    pub fn snapshot(&self) -> FocusSnapshot {
        self.scorer.snapshot()
    }

    /// Discard all analysis state (monitoring stopped).
    pub fn reset(&mut self) {
        self.presence.reset();
        self.scorer = FocusScorer::new(self.focus_config.clone());
        self.status = SubjectStatus::Unknown;
    }
}
