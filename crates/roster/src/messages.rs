//! Wire message shapes exchanged with the transport collaborator

use crate::subject::SubjectStatus;
use focus::FocusSnapshot;
use serde::{Deserialize, Serialize};

/// Default interval between status pushes from the monitored side (ms).
pub const DEFAULT_STATUS_INTERVAL_MS: u64 = 1500;

/// One-time registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    #[serde(default)]
    pub grade: String,
}

/// Periodic status push from a monitored subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub name: String,
    #[serde(default)]
    pub grade: String,
    pub status: SubjectStatus,
    pub timestamp: u64,
    #[serde(default)]
    pub focus: Option<FocusSnapshot>,
}

/// Messages arriving from the transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    Register(RegisterRequest),
    Status(StatusUpdate),
}

/// Reply to a registration attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RegisterReply {
    Registered,
    NameDuplicate { message: String },
}

impl RegisterReply {
    pub fn is_accepted(&self) -> bool {
        matches!(self, RegisterReply::Registered)
    }
}
