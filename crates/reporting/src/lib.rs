//! Session Aggregation & Reports
//!
//! Consumes one (score, status) pair per subject per second during active
//! teaching periods and maintains:
//! - Running totals and focus/seated streak accounting
//! - A sampled score series with FIFO eviction
//! - Periodic persistence through an injected key-value store
//!
//! On the read side, rolls daily records up into weekly and monthly
//! reports, month-over-month deltas, and a letter-grade banding.

pub mod aggregator;
pub mod engine;
pub mod grade;
pub mod record;

pub use aggregator::SessionAggregator;
pub use engine::{
    DailyReport, MonthFigures, MonthlyChanges, MonthlyComparison, MonthlyReport, ReportEngine,
    WeeklyReport,
};
pub use grade::FocusGrade;
pub use record::{daily_key, legacy_utc_key, DailyRecord, FocusSession, ScoreSample};
