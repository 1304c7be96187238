//! Per-second session aggregation with periodic persistence

use crate::record::{daily_key, DailyRecord, SAMPLE_EVERY_SECS};
use chrono::{Local, NaiveDate};
use roster::SubjectStatus;
use std::collections::HashMap;
use std::sync::Arc;
use storage::{get_json, put_json, KvStore};
use tracing::{debug, info, warn};

/// Maintains the current day's record map and writes it through the
/// injected store every ten recorded seconds.
///
/// Persistence is fire-and-forget: a failing write is logged and the next
/// cadence retries with the full map, so the hot path never blocks on it.
pub struct SessionAggregator {
    store: Arc<dyn KvStore>,
    today: NaiveDate,
    /// Pinned date for tests; live aggregators roll at local midnight
    fixed_date: bool,
    records: HashMap<String, DailyRecord>,
}

impl SessionAggregator {
    /// Aggregator for the current local day, resuming any persisted data.
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        let today = Local::now().date_naive();
        Self::load(store, today, false)
    }

    /// Aggregator pinned to a fixed date (no midnight rollover).
    pub fn with_date(store: Arc<dyn KvStore>, date: NaiveDate) -> Self {
        Self::load(store, date, true)
    }

    fn load(store: Arc<dyn KvStore>, today: NaiveDate, fixed_date: bool) -> Self {
        let records: HashMap<String, DailyRecord> =
            match get_json(store.as_ref(), &daily_key(today)) {
                Ok(Some(map)) => map,
                Ok(None) => HashMap::new(),
                Err(e) => {
                    warn!(error = %e, "could not resume today's records, starting empty");
                    HashMap::new()
                }
            };
        info!(
            date = %today,
            subjects = records.len(),
            "session aggregator ready"
        );
        Self {
            store,
            today,
            fixed_date,
            records,
        }
    }

    /// Fold one monitored second for a subject into today's record.
    ///
    /// Callers gate on the active teaching period; outside a lesson this
    /// must simply not be called.
    pub fn record_second(&mut self, name: &str, score: u8, status: SubjectStatus, now_ms: u64) {
        self.roll_day_if_needed();

        let today = self.today;
        let record = self
            .records
            .entry(name.to_string())
            .or_insert_with(|| DailyRecord::new(name, today, now_ms));
        record.record_second(score, status, now_ms);
        let due = record.total_seconds % SAMPLE_EVERY_SECS == 0;

        if due {
            self.flush();
        }
    }

    /// Persist the current day's map now.
    pub fn flush(&self) {
        match put_json(self.store.as_ref(), &daily_key(self.today), &self.records) {
            Ok(()) => debug!(date = %self.today, "daily records persisted"),
            Err(e) => warn!(error = %e, "failed to persist daily records"),
        }
    }

    fn roll_day_if_needed(&mut self) {
        if self.fixed_date {
            return;
        }
        let today = Local::now().date_naive();
        if today != self.today {
            info!(from = %self.today, to = %today, "rolling over to a new day");
            self.flush();
            self.today = today;
            self.records.clear();
        }
    }

    /// Today's record for a subject, if any seconds were recorded.
    pub fn record(&self, name: &str) -> Option<&DailyRecord> {
        self.records.get(name)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Number of subjects with data today.
    pub fn subject_count(&self) -> usize {
        self.records.len()
    }
}
