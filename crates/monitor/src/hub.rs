//! Monitoring-side hub: roster + aggregation + alert feed

use alerting::{Alert, AlertLog};
use reporting::SessionAggregator;
use roster::{InboundMessage, RegisterReply, Roster, RosterConfig, SubjectStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storage::KvStore;
use tracing::debug;

/// Shared handle to the external class schedule.
///
/// The class timer itself is an external collaborator; the pipeline only
/// reads whether a teaching period is currently in effect. Away-time and
/// focus accounting stop outside of one.
#[derive(Debug, Clone)]
pub struct TeachingPeriod(Arc<AtomicBool>);

impl TeachingPeriod {
    pub fn new(active: bool) -> Self {
        Self(Arc::new(AtomicBool::new(active)))
    }

    pub fn set_active(&self, active: bool) {
        self.0.store(active, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

impl Default for TeachingPeriod {
    fn default() -> Self {
        Self::new(true)
    }
}

/// The monitoring side's single mutable core: every inbound message and
/// every report-clock tick flows through here, on one control thread.
pub struct MonitorHub {
    roster: Roster,
    aggregator: SessionAggregator,
    alert_log: AlertLog,
    lesson: TeachingPeriod,
}

impl MonitorHub {
    pub fn new(store: Arc<dyn KvStore>, roster_config: RosterConfig, lesson: TeachingPeriod) -> Self {
        Self {
            roster: Roster::new(roster_config),
            aggregator: SessionAggregator::new(store),
            alert_log: AlertLog::default(),
            lesson,
        }
    }

    /// Hub with the aggregator pinned to a fixed date (tests).
    pub fn with_aggregator(
        aggregator: SessionAggregator,
        roster_config: RosterConfig,
        lesson: TeachingPeriod,
    ) -> Self {
        Self {
            roster: Roster::new(roster_config),
            aggregator,
            alert_log: AlertLog::default(),
            lesson,
        }
    }

    /// Apply one inbound transport message.
    ///
    /// Registration returns a reply for the transport to deliver; both
    /// kinds may raise alerts.
    pub fn handle_message(
        &mut self,
        id: &str,
        message: &InboundMessage,
        now_ms: u64,
    ) -> (Option<RegisterReply>, Vec<Alert>) {
        let (reply, alerts) = match message {
            InboundMessage::Register(request) => {
                let (reply, alerts) = self.roster.register(id, request, now_ms);
                (Some(reply), alerts)
            }
            InboundMessage::Status(update) => {
                let alerts =
                    self.roster
                        .apply_status(id, update, now_ms, self.lesson.is_active());
                (None, alerts)
            }
        };
        self.log_alerts(&alerts, now_ms);
        (reply, alerts)
    }

    /// Transport-level disconnect notification.
    pub fn handle_disconnect(&mut self, id: &str, now_ms: u64) -> Vec<Alert> {
        let alerts = self
            .roster
            .mark_disconnected(id, now_ms, self.lesson.is_active());
        self.log_alerts(&alerts, now_ms);
        alerts
    }

    /// One report-clock tick: watchdog checks, then one aggregated second
    /// per subject while a teaching period is active.
    pub fn report_tick(&mut self, now_ms: u64) -> Vec<Alert> {
        let lesson_active = self.lesson.is_active();
        let alerts = self.roster.tick(now_ms, lesson_active);

        if lesson_active {
            let seconds: Vec<(String, u8, SubjectStatus)> = self
                .roster
                .subjects()
                .filter(|subject| subject.status.is_active() && subject.focus.is_some())
                .map(|subject| (subject.name.clone(), subject.focus_score(), subject.status))
                .collect();
            for (name, score, status) in seconds {
                self.aggregator.record_second(&name, score, status, now_ms);
            }
        } else {
            debug!("outside teaching period, skipping aggregation");
        }

        self.log_alerts(&alerts, now_ms);
        alerts
    }

    fn log_alerts(&mut self, alerts: &[Alert], now_ms: u64) {
        for alert in alerts {
            self.alert_log.push(alert.clone(), now_ms);
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn aggregator(&self) -> &SessionAggregator {
        &self.aggregator
    }

    pub fn alert_log(&self) -> &AlertLog {
        &self.alert_log
    }

    pub fn teaching_period(&self) -> &TeachingPeriod {
        &self.lesson
    }

    /// Persist the day's aggregates now.
    pub fn flush(&self) {
        self.aggregator.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use focus::{FocusLevel, FocusSnapshot};
    use roster::{RegisterRequest, StatusUpdate};
    use storage::MemoryStore;

    fn hub() -> MonitorHub {
        let store = Arc::new(MemoryStore::new());
        let aggregator = SessionAggregator::with_date(
            store,
            NaiveDate::from_ymd_opt(2026, 8, 6).unwrap(),
        );
        MonitorHub::with_aggregator(aggregator, RosterConfig::default(), TeachingPeriod::new(true))
    }

    fn status_message(name: &str, status: SubjectStatus, score: u8) -> InboundMessage {
        InboundMessage::Status(StatusUpdate {
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
        })
    }

    #[test]
    fn test_registration_flows_into_alert_feed() {
        let mut hub = hub();
        let register = InboundMessage::Register(RegisterRequest {
            name: "Mina".to_string(),
            grade: "3".to_string(),
        });
        let (reply, alerts) = hub.handle_message("s1", &register, 0);
        assert!(reply.unwrap().is_accepted());
        assert_eq!(alerts.len(), 1);
        assert_eq!(hub.alert_log().len(), 1);
    }

    #[test]
    fn test_ticks_aggregate_reported_subjects() {
        let mut hub = hub();
        hub.handle_message(
            "s1",
            &status_message("Mina", SubjectStatus::Sitting, 90),
            0,
        );

        for second in 1..=5u64 {
            hub.report_tick(second * 1000);
        }
        let record = hub.aggregator().record("Mina").unwrap();
        assert_eq!(record.total_seconds, 5);
        assert_eq!(record.focused_seconds, 5);
    }

    #[test]
    fn test_no_aggregation_outside_teaching_period() {
        let mut hub = hub();
        hub.teaching_period().set_active(false);
        hub.handle_message(
            "s1",
            &status_message("Mina", SubjectStatus::Sitting, 90),
            0,
        );

        for second in 1..=5u64 {
            hub.report_tick(second * 1000);
        }
        assert!(hub.aggregator().record("Mina").is_none());
    }

    #[test]
    fn test_unresponsive_subjects_stop_aggregating() {
        let mut hub = hub();
        hub.handle_message(
            "s1",
            &status_message("Mina", SubjectStatus::Sitting, 90),
            0,
        );

        // Silence past the watchdog threshold forces no-response; the
        // aggregator stops seeing the subject from that tick on.
        hub.report_tick(11_000);
        let before = hub.aggregator().record("Mina").map(|r| r.total_seconds);
        hub.report_tick(12_000);
        let after = hub.aggregator().record("Mina").map(|r| r.total_seconds);
        assert_eq!(before, after);
    }

    #[test]
    fn test_disconnect_raises_alert() {
        let mut hub = hub();
        hub.handle_message(
            "s1",
            &status_message("Mina", SubjectStatus::Sitting, 90),
            0,
        );
        let alerts = hub.handle_disconnect("s1", 1000);
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].message.contains("disconnected"));
    }
}
