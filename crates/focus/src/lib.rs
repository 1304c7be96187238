//! Focus Scoring
//!
//! Turns per-frame behavioral signals (head-down, gaze-away, presence) into
//! a 0-100 engagement score once per second:
//! - Frame-rate accumulation into a compute-window accumulator
//! - Weighted sub-scores with a presence grace period
//! - Bounded score history with FIFO eviction
//!
//! Accumulation and scoring are decoupled: frames arrive at capture rate
//! (~20-30 Hz) while the score is computed on an independent 1 Hz tick.

pub mod accumulator;
pub mod config;
pub mod scorer;
pub mod snapshot;

pub use accumulator::FrameAccumulator;
pub use config::FocusConfig;
pub use scorer::FocusScorer;
pub use snapshot::{FocusLevel, FocusSnapshot, ScorePoint};
