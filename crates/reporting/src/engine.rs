//! Daily, weekly, and monthly report rollups

use crate::record::{daily_key, legacy_utc_key, DailyRecord, FocusSession, ScoreSample};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use storage::{get_json, KvStore};
use tracing::warn;

/// One day's report for a subject.
#[derive(Debug, Clone, Serialize)]
pub struct DailyReport {
    pub student_name: String,
    pub date: String,
    pub has_data: bool,
    /// Monitored seconds
    pub total_time: u64,
    /// Focused seconds
    pub focused_time: u64,
    /// `round(100 * focused / total)`, 0 with no recorded time
    pub focus_rate: u32,
    pub avg_score: u32,
    pub max_focus_duration: u64,
    pub max_seated_duration: u64,
    pub away_count: u32,
    pub session_count: usize,
    pub sessions: Vec<FocusSession>,
    pub scores: Vec<ScoreSample>,
}

impl DailyReport {
    fn empty(name: &str, date: NaiveDate) -> Self {
        Self {
            student_name: name.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            has_data: false,
            total_time: 0,
            focused_time: 0,
            focus_rate: 0,
            avg_score: 0,
            max_focus_duration: 0,
            max_seated_duration: 0,
            away_count: 0,
            session_count: 0,
            sessions: Vec::new(),
            scores: Vec::new(),
        }
    }
}

/// Week rollup (week starts Monday, days after today excluded).
#[derive(Debug, Clone, Serialize)]
pub struct WeeklyReport {
    pub student_name: String,
    pub week_start: String,
    pub days: Vec<DailyReport>,
    pub total_time: u64,
    pub focused_time: u64,
    pub focus_rate: u32,
    pub avg_score: u32,
    pub max_focus_duration: u64,
    pub max_seated_duration: u64,
    pub total_away_count: u32,
    pub active_days: u32,
}

/// Calendar-month rollup.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub student_name: String,
    pub year: i32,
    /// 1-12
    pub month: u32,
    pub days: Vec<DailyReport>,
    pub total_time: u64,
    pub focused_time: u64,
    pub focus_rate: u32,
    pub avg_score: u32,
    pub max_focus_duration: u64,
    pub max_seated_duration: u64,
    pub total_away_count: u32,
    pub active_days: u32,
}

/// Month-over-month headline figures.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthFigures {
    pub year: i32,
    pub month: u32,
    pub focused_time: u64,
    pub max_seated_duration: u64,
}

/// Absolute and percentage deltas, current vs previous month.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct MonthlyChanges {
    pub focused_time: i64,
    /// 0 when the previous month has no baseline
    pub focused_time_percent: i64,
    pub max_seated_duration: i64,
    pub max_seated_duration_percent: i64,
}

/// Current vs previous calendar month.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyComparison {
    pub has_last_month_data: bool,
    pub last_month: MonthFigures,
    pub current_month: MonthFigures,
    pub changes: MonthlyChanges,
}

/// Sums, maxes, and sample concatenation over a range of daily reports.
#[derive(Default)]
struct Rollup {
    total_time: u64,
    focused_time: u64,
    total_away_count: u32,
    max_focus_duration: u64,
    max_seated_duration: u64,
    active_days: u32,
    scores: Vec<u8>,
}

impl Rollup {
    fn add(&mut self, daily: &DailyReport) {
        if !daily.has_data {
            return;
        }
        self.active_days += 1;
        self.total_time += daily.total_time;
        self.focused_time += daily.focused_time;
        self.total_away_count += daily.away_count;
        self.max_focus_duration = self.max_focus_duration.max(daily.max_focus_duration);
        self.max_seated_duration = self.max_seated_duration.max(daily.max_seated_duration);
        self.scores.extend(daily.scores.iter().map(|s| s.score));
    }

    fn focus_rate(&self) -> u32 {
        rate(self.focused_time, self.total_time)
    }

    fn avg_score(&self) -> u32 {
        if self.scores.is_empty() {
            return 0;
        }
        let sum: u64 = self.scores.iter().map(|&s| s as u64).sum();
        (sum as f64 / self.scores.len() as f64).round() as u32
    }
}

fn rate(focused: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    (focused as f64 / total as f64 * 100.0).round() as u32
}

fn percent_change(current: u64, baseline: u64) -> i64 {
    if baseline == 0 {
        return 0;
    }
    ((current as f64 - baseline as f64) / baseline as f64 * 100.0).round() as i64
}

/// Read side over the persisted daily records.
///
/// Absent or corrupt documents degrade to empty reports (`has_data:
/// false`); nothing here returns an error to the caller.
pub struct ReportEngine {
    store: Arc<dyn KvStore>,
    today_override: Option<NaiveDate>,
}

impl ReportEngine {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self {
            store,
            today_override: None,
        }
    }

    /// Engine with a pinned "today" for deterministic range math.
    pub fn with_today(store: Arc<dyn KvStore>, today: NaiveDate) -> Self {
        Self {
            store,
            today_override: Some(today),
        }
    }

    fn today(&self) -> NaiveDate {
        self.today_override
            .unwrap_or_else(|| Local::now().date_naive())
    }

    fn load_day(&self, date: NaiveDate) -> HashMap<String, DailyRecord> {
        match get_json(self.store.as_ref(), &daily_key(date)) {
            Ok(Some(map)) => return map,
            Ok(None) => {}
            Err(e) => {
                warn!(date = %date, error = %e, "unreadable daily record, treating as empty");
                return HashMap::new();
            }
        }

        // Older deployments keyed days by UTC date; probe that as well.
        if let Some(key) = legacy_utc_key(date) {
            match get_json(self.store.as_ref(), &key) {
                Ok(Some(map)) => return map,
                Ok(None) => {}
                Err(e) => {
                    warn!(date = %date, error = %e, "unreadable legacy record, treating as empty")
                }
            }
        }
        HashMap::new()
    }

    /// One subject's report for a calendar day (default today).
    pub fn daily_report(&self, name: &str, date: Option<NaiveDate>) -> DailyReport {
        let date = date.unwrap_or_else(|| self.today());
        let map = self.load_day(date);
        let Some(record) = map.get(name) else {
            return DailyReport::empty(name, date);
        };

        DailyReport {
            student_name: name.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            has_data: true,
            total_time: record.total_seconds,
            focused_time: record.focused_seconds,
            focus_rate: rate(record.focused_seconds, record.total_seconds),
            avg_score: record.avg_score,
            max_focus_duration: record.max_focus_duration,
            max_seated_duration: record.max_seated_duration,
            away_count: record.away_count,
            session_count: record.sessions.len(),
            sessions: record.sessions.clone(),
            scores: record.scores.clone(),
        }
    }

    /// This week's rollup for a subject (Monday through today).
    pub fn weekly_report(&self, name: &str) -> WeeklyReport {
        let today = self.today();
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);

        let mut days = Vec::new();
        let mut rollup = Rollup::default();
        for offset in 0..7 {
            let day = week_start + Duration::days(offset);
            if day > today {
                break;
            }
            let daily = self.daily_report(name, Some(day));
            rollup.add(&daily);
            days.push(daily);
        }

        WeeklyReport {
            student_name: name.to_string(),
            week_start: week_start.format("%Y-%m-%d").to_string(),
            days,
            total_time: rollup.total_time,
            focused_time: rollup.focused_time,
            focus_rate: rollup.focus_rate(),
            avg_score: rollup.avg_score(),
            max_focus_duration: rollup.max_focus_duration,
            max_seated_duration: rollup.max_seated_duration,
            total_away_count: rollup.total_away_count,
            active_days: rollup.active_days,
        }
    }

    /// Calendar-month rollup for a subject (default current month).
    pub fn monthly_report(&self, name: &str, year: Option<i32>, month: Option<u32>) -> MonthlyReport {
        let today = self.today();
        let year = year.unwrap_or_else(|| today.year());
        let month = month.unwrap_or_else(|| today.month());

        let mut days = Vec::new();
        let mut rollup = Rollup::default();
        let mut cursor = NaiveDate::from_ymd_opt(year, month, 1);
        if cursor.is_none() {
            warn!(year, month, "invalid month requested, returning empty report");
        }
        while let Some(day) = cursor {
            if day.month() != month || day.year() != year || day > today {
                break;
            }
            let daily = self.daily_report(name, Some(day));
            rollup.add(&daily);
            days.push(daily);
            cursor = day.succ_opt();
        }

        MonthlyReport {
            student_name: name.to_string(),
            year,
            month,
            days,
            total_time: rollup.total_time,
            focused_time: rollup.focused_time,
            focus_rate: rollup.focus_rate(),
            avg_score: rollup.avg_score(),
            max_focus_duration: rollup.max_focus_duration,
            max_seated_duration: rollup.max_seated_duration,
            total_away_count: rollup.total_away_count,
            active_days: rollup.active_days,
        }
    }

    /// Current vs previous calendar month for a subject.
    pub fn monthly_comparison(&self, name: &str) -> MonthlyComparison {
        let today = self.today();
        let (current_year, current_month) = (today.year(), today.month());
        let (last_year, last_month) = if current_month == 1 {
            (current_year - 1, 12)
        } else {
            (current_year, current_month - 1)
        };

        let current = self.monthly_report(name, Some(current_year), Some(current_month));
        let last = self.monthly_report(name, Some(last_year), Some(last_month));

        MonthlyComparison {
            has_last_month_data: last.active_days > 0,
            last_month: MonthFigures {
                year: last_year,
                month: last_month,
                focused_time: last.focused_time,
                max_seated_duration: last.max_seated_duration,
            },
            current_month: MonthFigures {
                year: current_year,
                month: current_month,
                focused_time: current.focused_time,
                max_seated_duration: current.max_seated_duration,
            },
            changes: MonthlyChanges {
                focused_time: current.focused_time as i64 - last.focused_time as i64,
                focused_time_percent: percent_change(current.focused_time, last.focused_time),
                max_seated_duration: current.max_seated_duration as i64
                    - last.max_seated_duration as i64,
                max_seated_duration_percent: percent_change(
                    current.max_seated_duration,
                    last.max_seated_duration,
                ),
            },
        }
    }
}
