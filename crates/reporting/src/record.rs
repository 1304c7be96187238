//! Persisted daily record and per-second streak accounting

use chrono::{Local, NaiveDate, TimeZone, Utc};
use roster::SubjectStatus;
use serde::{Deserialize, Serialize};

/// Score at or above this counts a second as focused.
pub const FOCUS_THRESHOLD: u8 = 70;

/// One score sample is retained every this many seconds.
pub const SAMPLE_EVERY_SECS: u64 = 10;

/// Retained score samples per day (~1 h at one per 10 s).
pub const MAX_SCORE_SAMPLES: usize = 360;

/// Storage key for a calendar day's record map.
pub fn daily_key(date: NaiveDate) -> String {
    format!("daily_{}", date.format("%Y-%m-%d"))
}

/// Legacy fallback key for a local date.
///
/// Early deployments keyed records by the UTC date of local midnight, so
/// a reader in a timezone ahead of UTC must also probe the previous UTC
/// day. `None` when both keys coincide.
pub fn legacy_utc_key(date: NaiveDate) -> Option<String> {
    legacy_utc_key_in(date, &Local)
}

pub(crate) fn legacy_utc_key_in<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<String> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    let local = tz.from_local_datetime(&midnight).single()?;
    let utc_date = local.with_timezone(&Utc).date_naive();
    (utc_date != date).then(|| daily_key(utc_date))
}

/// A completed continuous-focus streak.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusSession {
    pub start_ms: u64,
    pub end_ms: u64,
    pub duration_secs: u64,
}

/// A sampled score point (one per 10 s).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreSample {
    pub time_ms: u64,
    pub score: u8,
}

/// Per-subject, per-calendar-day aggregate, persisted under
/// `daily_<YYYY-MM-DD>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub student_name: String,
    /// Calendar date, `YYYY-MM-DD`
    pub date: String,
    pub start_time_ms: u64,
    pub last_update_ms: u64,
    pub total_seconds: u64,
    pub focused_seconds: u64,
    /// Sampled score series, oldest evicted first
    pub scores: Vec<ScoreSample>,
    /// Completed focus streaks
    pub sessions: Vec<FocusSession>,
    pub current_session_start_ms: Option<u64>,
    pub max_focus_duration: u64,
    pub current_focus_duration: u64,
    pub away_count: u32,
    pub avg_score: u32,
    pub last_status: Option<SubjectStatus>,
    pub max_seated_duration: u64,
    pub current_seated_duration: u64,
    pub seated_session_start_ms: Option<u64>,
}

impl DailyRecord {
    pub fn new(student_name: impl Into<String>, date: NaiveDate, now_ms: u64) -> Self {
        Self {
            student_name: student_name.into(),
            date: date.format("%Y-%m-%d").to_string(),
            start_time_ms: now_ms,
            last_update_ms: now_ms,
            total_seconds: 0,
            focused_seconds: 0,
            scores: Vec::new(),
            sessions: Vec::new(),
            current_session_start_ms: None,
            max_focus_duration: 0,
            current_focus_duration: 0,
            away_count: 0,
            avg_score: 0,
            last_status: None,
            max_seated_duration: 0,
            current_seated_duration: 0,
            seated_session_start_ms: None,
        }
    }

    /// Fold one monitored second into the record.
    ///
    /// A second is focused iff the score clears the threshold and the
    /// subject is not away. `away_count` and the seated streak react only
    /// to the transition edge into away, never while away persists.
    pub fn record_second(&mut self, score: u8, status: SubjectStatus, now_ms: u64) {
        self.last_update_ms = now_ms;
        self.total_seconds += 1;

        let is_away = status == SubjectStatus::Away;
        let is_focused = score >= FOCUS_THRESHOLD && !is_away;

        if is_focused {
            self.focused_seconds += 1;
            if self.current_session_start_ms.is_none() {
                self.current_session_start_ms = Some(now_ms);
                self.current_focus_duration = 0;
            }
            self.current_focus_duration += 1;
            // Live max, not only at streak end.
            if self.current_focus_duration > self.max_focus_duration {
                self.max_focus_duration = self.current_focus_duration;
            }
        } else if let Some(start) = self.current_session_start_ms.take() {
            self.sessions.push(FocusSession {
                start_ms: start,
                end_ms: now_ms,
                duration_secs: self.current_focus_duration,
            });
            self.current_focus_duration = 0;
        }

        let was_away = self.last_status == Some(SubjectStatus::Away);
        if is_away && !was_away {
            self.away_count += 1;
            if self.seated_session_start_ms.is_some() && self.current_seated_duration > 0 {
                if self.current_seated_duration > self.max_seated_duration {
                    self.max_seated_duration = self.current_seated_duration;
                }
                self.seated_session_start_ms = None;
                self.current_seated_duration = 0;
            }
        }

        if !is_away {
            if self.seated_session_start_ms.is_none() {
                self.seated_session_start_ms = Some(now_ms);
                self.current_seated_duration = 0;
            }
            self.current_seated_duration += 1;
            if self.current_seated_duration > self.max_seated_duration {
                self.max_seated_duration = self.current_seated_duration;
            }
        }

        self.last_status = Some(status);

        if self.total_seconds % SAMPLE_EVERY_SECS == 0 {
            self.scores.push(ScoreSample {
                time_ms: now_ms,
                score,
            });
            while self.scores.len() > MAX_SCORE_SAMPLES {
                self.scores.remove(0);
            }
        }

        if !self.scores.is_empty() {
            let sum: u64 = self.scores.iter().map(|s| s.score as u64).sum();
            self.avg_score = (sum as f64 / self.scores.len() as f64).round() as u32;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn feed(record: &mut DailyRecord, seconds: &[(u8, SubjectStatus)]) {
        for (i, &(score, status)) in seconds.iter().enumerate() {
            record.record_second(score, status, (i as u64 + 1) * 1000);
        }
    }

    #[test]
    fn test_focus_streak_accounting() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        let sitting = SubjectStatus::Sitting;
        feed(
            &mut record,
            &[
                (80, sitting),
                (80, sitting),
                (80, sitting),
                (40, sitting),
                (90, sitting),
                (90, sitting),
            ],
        );

        assert_eq!(record.sessions.len(), 1);
        assert_eq!(record.sessions[0].duration_secs, 3);
        assert_eq!(record.current_focus_duration, 2);
        assert!(record.current_session_start_ms.is_some());
        assert_eq!(record.max_focus_duration, 3);
        assert_eq!(record.focused_seconds, 5);
        assert_eq!(record.total_seconds, 6);
    }

    #[test]
    fn test_away_count_once_per_episode() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        let mut seconds = vec![(90, SubjectStatus::Sitting); 5];
        seconds.extend(vec![(0, SubjectStatus::Away); 45]);
        seconds.extend(vec![(90, SubjectStatus::Sitting); 5]);
        feed(&mut record, &seconds);

        assert_eq!(record.away_count, 1);
    }

    #[test]
    fn test_away_second_never_counts_as_focused() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        // High score while away: the away status wins.
        record.record_second(95, SubjectStatus::Away, 1000);
        assert_eq!(record.focused_seconds, 0);
    }

    #[test]
    fn test_seated_streak_ends_on_away_edge() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        let mut seconds = vec![(90, SubjectStatus::Sitting); 30];
        seconds.extend(vec![(0, SubjectStatus::Away); 10]);
        seconds.extend(vec![(90, SubjectStatus::Sitting); 12]);
        feed(&mut record, &seconds);

        assert_eq!(record.max_seated_duration, 30);
        assert_eq!(record.current_seated_duration, 12);
        assert_eq!(record.away_count, 1);
    }

    #[test]
    fn test_score_sampling_and_average() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        feed(&mut record, &vec![(80, SubjectStatus::Sitting); 30]);

        // One sample per ten seconds.
        assert_eq!(record.scores.len(), 3);
        assert_eq!(record.avg_score, 80);
    }

    #[test]
    fn test_sample_list_is_bounded() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        for second in 1..=(MAX_SCORE_SAMPLES as u64 + 50) * SAMPLE_EVERY_SECS {
            record.record_second(70, SubjectStatus::Sitting, second * 1000);
        }
        assert_eq!(record.scores.len(), MAX_SCORE_SAMPLES);
    }

    #[test]
    fn test_invariants_hold() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        let mut seconds = Vec::new();
        for i in 0..200u32 {
            let status = if i % 17 == 0 {
                SubjectStatus::Away
            } else {
                SubjectStatus::Sitting
            };
            seconds.push(((i % 101) as u8, status));
        }
        feed(&mut record, &seconds);

        assert!(record.total_seconds >= record.focused_seconds);
        assert!(record.max_focus_duration >= record.current_focus_duration);
        assert!(record.max_seated_duration >= record.current_seated_duration);
    }

    #[test]
    fn test_serde_round_trip() {
        let mut record = DailyRecord::new("Mina", date(), 0);
        feed(&mut record, &vec![(85, SubjectStatus::Sitting); 25]);

        let json = serde_json::to_string(&record).unwrap();
        let restored: DailyRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, record);
    }

    #[test]
    fn test_legacy_key_for_utc_ahead_timezone() {
        // Local midnight in UTC+9 lands on the previous UTC day.
        let kst = FixedOffset::east_opt(9 * 3600).unwrap();
        let key = legacy_utc_key_in(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), &kst);
        assert_eq!(key, Some("daily_2025-12-31".to_string()));

        // In UTC itself the keys coincide and there is no fallback.
        let key = legacy_utc_key_in(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), &Utc);
        assert_eq!(key, None);
    }
}
