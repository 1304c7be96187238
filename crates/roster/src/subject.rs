//! Subject record and status

use focus::{FocusSnapshot, ScorePoint};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Authoritative subject status.
///
/// The first four come from the monitored side's posture pipeline; the
/// last two are imposed by the monitoring side's watchdog and transport
/// events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectStatus {
    #[default]
    Unknown,
    Standing,
    Sitting,
    Away,
    HandRaised,
    NoResponse,
    Disconnected,
}

impl SubjectStatus {
    /// Whether this status still counts toward name uniqueness and
    /// watchdog checks.
    pub fn is_active(self) -> bool {
        !matches!(self, SubjectStatus::NoResponse | SubjectStatus::Disconnected)
    }
}

/// Long-lived per-subject state, keyed by a stable connection identifier.
#[derive(Debug, Clone)]
pub struct Subject {
    pub id: String,
    pub name: String,
    pub grade: String,
    pub status: SubjectStatus,
    pub last_update_ms: u64,
    /// Start of the current away episode, if one is open
    pub away_start_ms: Option<u64>,
    /// Accumulated away time across closed episodes
    pub total_away_ms: u64,
    /// Latest focus snapshot from the status push
    pub focus: Option<FocusSnapshot>,
    /// Bounded ring of received focus scores, oldest evicted first
    pub focus_history: VecDeque<ScorePoint>,
    pub disconnected_at_ms: Option<u64>,
    pub no_response_at_ms: Option<u64>,
}

impl Subject {
    pub fn new(id: impl Into<String>, name: impl Into<String>, grade: impl Into<String>, now_ms: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            grade: grade.into(),
            status: SubjectStatus::Unknown,
            last_update_ms: now_ms,
            away_start_ms: None,
            total_away_ms: 0,
            focus: None,
            focus_history: VecDeque::new(),
            disconnected_at_ms: None,
            no_response_at_ms: None,
        }
    }

    /// Latest focus score, 0 when none has arrived yet.
    pub fn focus_score(&self) -> u8 {
        self.focus.as_ref().map(|f| f.score).unwrap_or(0)
    }

    /// Elapsed time in the current away episode.
    pub fn away_elapsed_ms(&self, now_ms: u64) -> u64 {
        self.away_start_ms
            .map(|start| now_ms.saturating_sub(start))
            .unwrap_or(0)
    }
}
