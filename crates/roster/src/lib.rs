//! Subject Roster
//!
//! The monitoring side's authoritative view of every subject:
//! - An id-keyed registry of plain state records
//! - The status state machine (posture, away, no-response, disconnect)
//! - A 1 Hz watchdog for silent and departed subjects
//! - Display-name uniqueness over active subjects
//!
//! Transitions return the alerts they raise; nothing here renders, plays
//! sounds, or talks to the network.

pub mod messages;
pub mod registry;
pub mod subject;

pub use messages::{
    InboundMessage, RegisterReply, RegisterRequest, StatusUpdate, DEFAULT_STATUS_INTERVAL_MS,
};
pub use registry::{Roster, RosterConfig, RosterStats};
pub use subject::{Subject, SubjectStatus};
