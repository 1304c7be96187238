//! Posture Analysis
//!
//! Per-frame subject state from landmark geometry:
//! - Standing/sitting classification from torso-to-leg proportions
//! - Hand-raise detection (wrist above head)
//! - Presence tracking with dual away-timeout paths
//!
//! Classification is a pure function over a single frame; it degrades to
//! `Unknown` on low-confidence landmarks and never fails.

pub mod classifier;
pub mod config;
pub mod presence;

pub use classifier::{classify, PostureClass};
pub use config::PostureConfig;
pub use presence::{PresenceConfig, PresenceTracker};
