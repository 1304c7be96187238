//! Landmark Frame Types
//!
//! Input side of the attention pipeline. An external vision collaborator
//! delivers one frame of named anatomical points per capture tick
//! (~20-30 Hz); this crate defines the frame shape, the fixed landmark
//! index table, and the geometry helpers shared by the posture and focus
//! analyzers.

pub mod frame;
pub mod index;

pub use frame::{Landmark, LandmarkFrame};
pub use index::PoseIndex;
