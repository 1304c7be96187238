//! Subject registry and status state machine

use crate::messages::{RegisterReply, RegisterRequest, StatusUpdate};
use crate::subject::{Subject, SubjectStatus};
use alerting::{Alert, AlertLatch};
use focus::{FocusLevel, ScorePoint};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Registry and watchdog configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    /// Silence on the status channel before a subject is forced to
    /// no-response (ms)
    pub no_response_after_ms: u64,

    /// Grace period before a disconnected subject is evicted (ms)
    pub evict_disconnected_after_ms: u64,

    /// Continuous away time that raises a warning alert (ms)
    pub away_warning_ms: u64,

    /// Continuous away time that raises a critical alert (ms)
    pub away_critical_ms: u64,

    /// Received-score ring capacity per subject
    pub focus_history_capacity: usize,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            no_response_after_ms: 10_000,
            evict_disconnected_after_ms: 60_000,
            away_warning_ms: 60_000,
            away_critical_ms: 180_000,
            focus_history_capacity: 600,
        }
    }
}

/// Headcount by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub standing: usize,
    pub sitting: usize,
    /// Away, unresponsive, and disconnected subjects combined
    pub away: usize,
    pub hand_raised: usize,
}

/// Id-keyed table of subject records plus the transition rules over them.
///
/// Every mutation returns the alerts it raised; duration alerts are
/// edge-triggered through a per-episode latch, never re-fired while the
/// condition persists.
#[derive(Debug, Default)]
pub struct Roster {
    config: RosterConfig,
    subjects: HashMap<String, Subject>,
    latch: AlertLatch,
}

impl Roster {
    pub fn new(config: RosterConfig) -> Self {
        Self {
            config,
            subjects: HashMap::new(),
            latch: AlertLatch::new(),
        }
    }

    /// Handle a registration request.
    ///
    /// The display name must be unique among *active* subjects; a
    /// same-named subject that is disconnected or unresponsive is silently
    /// replaced.
    pub fn register(
        &mut self,
        id: &str,
        request: &RegisterRequest,
        now_ms: u64,
    ) -> (RegisterReply, Vec<Alert>) {
        let mut stale_ids = Vec::new();
        for (other_id, subject) in &self.subjects {
            if subject.name == request.name && other_id != id {
                if subject.status.is_active() {
                    info!(name = %request.name, "registration rejected, name in use");
                    let message = format!(
                        "The name \"{}\" is already in use. Please rejoin with a different name.",
                        request.name
                    );
                    return (RegisterReply::NameDuplicate { message }, Vec::new());
                }
                stale_ids.push(other_id.clone());
            }
        }

        for stale_id in stale_ids {
            debug!(id = %stale_id, "replacing stale subject with same name");
            self.subjects.remove(&stale_id);
            self.latch.release_prefix(&format!("{}/", stale_id));
        }

        let mut alerts = Vec::new();
        if !self.subjects.contains_key(id) {
            self.subjects
                .insert(id.to_string(), Subject::new(id, &request.name, &request.grade, now_ms));
            info!(id, name = %request.name, "subject registered");
            alerts.push(Alert::info(format!("{} has joined the class.", request.name)));
        }
        (RegisterReply::Registered, alerts)
    }

    /// Apply a periodic status push from the monitored side.
    ///
    /// Away-time accounting and duration/focus alerts only run during an
    /// active teaching period.
    pub fn apply_status(
        &mut self,
        id: &str,
        update: &StatusUpdate,
        now_ms: u64,
        lesson_active: bool,
    ) -> Vec<Alert> {
        let mut alerts = Vec::new();

        let subject = self.subjects.entry(id.to_string()).or_insert_with(|| {
            debug!(id, name = %update.name, "status from unseen subject, creating record");
            Subject::new(id, &update.name, &update.grade, now_ms)
        });

        let prev = subject.status;
        subject.status = update.status;
        subject.last_update_ms = now_ms;
        subject.no_response_at_ms = None;
        if !update.grade.is_empty() {
            subject.grade = update.grade.clone();
        }

        if let Some(snapshot) = &update.focus {
            subject.focus_history.push_back(ScorePoint {
                score: snapshot.score,
                timestamp_ms: now_ms,
            });
            while subject.focus_history.len() > self.config.focus_history_capacity {
                subject.focus_history.pop_front();
            }
            subject.focus = Some(snapshot.clone());

            if lesson_active {
                let key = format!("{}/very_low", id);
                if snapshot.level == FocusLevel::VeryLow {
                    if self.latch.fire(&key) {
                        alerts.push(Alert::warning(format!(
                            "{}'s focus is very low ({}%).",
                            subject.name, snapshot.score
                        )));
                    }
                } else {
                    self.latch.release(&key);
                }
            }
        }

        if lesson_active {
            if subject.status == SubjectStatus::Away && prev != SubjectStatus::Away {
                subject.away_start_ms = Some(now_ms);
            } else if subject.status != SubjectStatus::Away && prev == SubjectStatus::Away {
                if let Some(start) = subject.away_start_ms.take() {
                    subject.total_away_ms += now_ms.saturating_sub(start);
                }
                self.latch.release(&format!("{}/away_warning", id));
                self.latch.release(&format!("{}/away_critical", id));
            }
        } else {
            subject.away_start_ms = None;
        }

        if lesson_active && subject.status == SubjectStatus::Away {
            let elapsed = subject.away_elapsed_ms(now_ms);
            let name = subject.name.clone();
            alerts.extend(self.away_duration_alerts(id, &name, elapsed));
        }

        alerts
    }

    /// Explicit disconnect notification from the transport.
    pub fn mark_disconnected(&mut self, id: &str, now_ms: u64, lesson_active: bool) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if let Some(subject) = self.subjects.get_mut(id) {
            if lesson_active && subject.status == SubjectStatus::Away {
                if let Some(start) = subject.away_start_ms.take() {
                    subject.total_away_ms += now_ms.saturating_sub(start);
                }
                self.latch.release(&format!("{}/away_warning", id));
                self.latch.release(&format!("{}/away_critical", id));
            }
            subject.status = SubjectStatus::Disconnected;
            subject.disconnected_at_ms = Some(now_ms);
            warn!(id, name = %subject.name, "subject disconnected");
            alerts.push(Alert::warning(format!("{} has disconnected.", subject.name)));
        }
        alerts
    }

    /// 1 Hz watchdog over all subjects.
    ///
    /// Forces silent subjects to no-response, raises away-duration alerts
    /// between pushes, and evicts subjects that stayed disconnected past
    /// the grace period.
    pub fn tick(&mut self, now_ms: u64, lesson_active: bool) -> Vec<Alert> {
        let mut alerts = Vec::new();
        let mut pending_away: Vec<(String, String, u64)> = Vec::new();
        let mut evict_ids = Vec::new();

        for (id, subject) in self.subjects.iter_mut() {
            if lesson_active && subject.status == SubjectStatus::Away {
                pending_away.push((
                    id.clone(),
                    subject.name.clone(),
                    subject.away_elapsed_ms(now_ms),
                ));
            }

            if subject.status.is_active()
                && now_ms.saturating_sub(subject.last_update_ms) > self.config.no_response_after_ms
            {
                if subject.status == SubjectStatus::Away && lesson_active {
                    if let Some(start) = subject.away_start_ms.take() {
                        subject.total_away_ms += now_ms.saturating_sub(start);
                    }
                    self.latch.release(&format!("{}/away_warning", id));
                    self.latch.release(&format!("{}/away_critical", id));
                }
                subject.status = SubjectStatus::NoResponse;
                subject.no_response_at_ms = Some(now_ms);
                warn!(id = %id, name = %subject.name, "subject is not responding");
                alerts.push(Alert::warning(format!("{} is not responding.", subject.name)));
            }

            if subject.status == SubjectStatus::Disconnected {
                if let Some(disconnected_at) = subject.disconnected_at_ms {
                    if now_ms.saturating_sub(disconnected_at)
                        > self.config.evict_disconnected_after_ms
                    {
                        evict_ids.push(id.clone());
                    }
                }
            }
        }

        for (id, name, elapsed) in pending_away {
            alerts.extend(self.away_duration_alerts(&id, &name, elapsed));
        }

        for id in evict_ids {
            debug!(id = %id, "evicting subject after disconnect grace period");
            self.subjects.remove(&id);
            self.latch.release_prefix(&format!("{}/", id));
        }

        alerts
    }

    fn away_duration_alerts(&mut self, id: &str, name: &str, elapsed_ms: u64) -> Vec<Alert> {
        let mut alerts = Vec::new();
        if elapsed_ms >= self.config.away_warning_ms
            && self.latch.fire(&format!("{}/away_warning", id))
        {
            alerts.push(Alert::warning(format!(
                "{} has been away for {} min.",
                name,
                self.config.away_warning_ms / 60_000
            )));
        }
        if elapsed_ms >= self.config.away_critical_ms
            && self.latch.fire(&format!("{}/away_critical", id))
        {
            alerts.push(Alert::critical(format!(
                "{} has been away for {} min!",
                name,
                self.config.away_critical_ms / 60_000
            )));
        }
        alerts
    }

    pub fn get(&self, id: &str) -> Option<&Subject> {
        self.subjects.get(id)
    }

    pub fn subjects(&self) -> impl Iterator<Item = &Subject> {
        self.subjects.values()
    }

    pub fn len(&self) -> usize {
        self.subjects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subjects.is_empty()
    }

    /// Headcount by status for the dashboard.
    pub fn stats(&self) -> RosterStats {
        let mut stats = RosterStats {
            total: self.subjects.len(),
            ..Default::default()
        };
        for subject in self.subjects.values() {
            match subject.status {
                SubjectStatus::Standing => stats.standing += 1,
                SubjectStatus::Sitting => stats.sitting += 1,
                SubjectStatus::Away
                | SubjectStatus::NoResponse
                | SubjectStatus::Disconnected => stats.away += 1,
                SubjectStatus::HandRaised => stats.hand_raised += 1,
                SubjectStatus::Unknown => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use focus::FocusSnapshot;

    fn request(name: &str) -> RegisterRequest {
        RegisterRequest {
            name: name.to_string(),
            grade: "3".to_string(),
        }
    }

    fn status(name: &str, status: SubjectStatus, score: u8) -> StatusUpdate {
        StatusUpdate {
            name: name.to_string(),
            grade: String::new(),
            status,
            timestamp: 0,
            focus: Some(FocusSnapshot {
                score,
                level: FocusLevel::from_score(score),
                head_down: false,
                looking_away: false,
                present: true,
                history: Vec::new(),
            }),
        }
    }

    #[test]
    fn test_duplicate_active_name_is_rejected() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);

        let (reply, alerts) = roster.register("s2", &request("Mina"), 1000);
        assert!(!reply.is_accepted());
        assert!(alerts.is_empty());
        assert_eq!(roster.len(), 1);
    }

    #[test]
    fn test_same_name_over_disconnected_subject_replaces_it() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.mark_disconnected("s1", 5_000, true);

        let (reply, _) = roster.register("s2", &request("Mina"), 10_000);
        assert!(reply.is_accepted());
        assert_eq!(roster.len(), 1);
        assert!(roster.get("s1").is_none());
        assert!(roster.get("s2").is_some());
    }

    #[test]
    fn test_away_episode_accumulates_on_return() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);

        roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 10_000, true);
        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 90), 25_000, true);

        let subject = roster.get("s1").unwrap();
        assert_eq!(subject.total_away_ms, 15_000);
        assert!(subject.away_start_ms.is_none());
    }

    #[test]
    fn test_away_alerts_fire_once_per_episode() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 0, true);

        // Keep pushing away status every second past the warning line.
        let mut warnings = 0;
        let mut criticals = 0;
        for second in 1..200u64 {
            let alerts =
                roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), second * 1000, true);
            for alert in alerts {
                match alert.severity {
                    alerting::Severity::Warning => warnings += 1,
                    alerting::Severity::Critical => criticals += 1,
                    _ => {}
                }
            }
        }
        assert_eq!(warnings, 1);
        assert_eq!(criticals, 1);
    }

    #[test]
    fn test_new_away_episode_realerts() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);

        roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 0, true);
        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 61_000, true);
        assert_eq!(alerts.len(), 1);

        // Come back, then leave again: the warning fires for the new episode.
        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 90), 62_000, true);
        roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 70_000, true);
        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 131_000, true);
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].severity, alerting::Severity::Warning);
    }

    #[test]
    fn test_watchdog_forces_no_response_once() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 90), 0, true);

        let alerts = roster.tick(11_000, true);
        assert_eq!(alerts.len(), 1);
        assert_eq!(roster.get("s1").unwrap().status, SubjectStatus::NoResponse);

        // Further ticks stay quiet.
        assert!(roster.tick(12_000, true).is_empty());
    }

    #[test]
    fn test_status_push_recovers_from_no_response() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.tick(11_000, true);
        assert_eq!(roster.get("s1").unwrap().status, SubjectStatus::NoResponse);

        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 90), 12_000, true);
        let subject = roster.get("s1").unwrap();
        assert_eq!(subject.status, SubjectStatus::Sitting);
        assert!(subject.no_response_at_ms.is_none());
    }

    #[test]
    fn test_disconnected_subject_is_evicted_after_grace() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.mark_disconnected("s1", 1_000, true);

        roster.tick(30_000, true);
        assert_eq!(roster.len(), 1);

        roster.tick(62_000, true);
        assert!(roster.is_empty());
    }

    #[test]
    fn test_very_low_focus_alert_is_suppressed_until_recovery() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);

        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 10), 1000, true);
        assert_eq!(alerts.len(), 1);

        // Still very low: no repeat.
        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 15), 2000, true);
        assert!(alerts.is_empty());

        // Recover, then drop again: fires anew.
        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 80), 3000, true);
        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 5), 4000, true);
        assert_eq!(alerts.len(), 1);
    }

    #[test]
    fn test_no_accounting_outside_lesson() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);

        roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 10_000, false);
        let alerts = roster.apply_status("s1", &status("Mina", SubjectStatus::Away, 0), 200_000, false);
        assert!(alerts.is_empty());
        assert_eq!(roster.get("s1").unwrap().total_away_ms, 0);
    }

    #[test]
    fn test_focus_history_is_bounded() {
        let config = RosterConfig {
            focus_history_capacity: 5,
            ..Default::default()
        };
        let mut roster = Roster::new(config);
        roster.register("s1", &request("Mina"), 0);
        for second in 0..10u64 {
            roster.apply_status(
                "s1",
                &status("Mina", SubjectStatus::Sitting, 90),
                second * 1000,
                true,
            );
        }
        assert_eq!(roster.get("s1").unwrap().focus_history.len(), 5);
    }

    #[test]
    fn test_stats_headcount() {
        let mut roster = Roster::default();
        roster.register("s1", &request("Mina"), 0);
        roster.register("s2", &request("Jun"), 0);
        roster.register("s3", &request("Ha-eun"), 0);

        roster.apply_status("s1", &status("Mina", SubjectStatus::Sitting, 90), 0, true);
        roster.apply_status("s2", &status("Jun", SubjectStatus::HandRaised, 90), 0, true);
        roster.mark_disconnected("s3", 0, true);

        let stats = roster.stats();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.sitting, 1);
        assert_eq!(stats.hand_raised, 1);
        assert_eq!(stats.away, 1);
    }
}
