//! Bounded in-memory alert feed

use crate::{Alert, Severity};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default feed capacity.
pub const DEFAULT_CAPACITY: usize = 50;

/// A timestamped alert in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertEntry {
    pub message: String,
    pub severity: Severity,
    pub timestamp_ms: u64,
}

/// Bounded feed of recent alerts, newest last, oldest evicted first.
#[derive(Debug, Clone)]
pub struct AlertLog {
    entries: VecDeque<AlertEntry>,
    capacity: usize,
}

impl AlertLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an alert, evicting the oldest entry when full.
    pub fn push(&mut self, alert: Alert, timestamp_ms: u64) {
        while self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(AlertEntry {
            message: alert.message,
            severity: alert.severity,
            timestamp_ms,
        });
    }

    /// The most recent `count` entries, newest first.
    pub fn recent(&self, count: usize) -> Vec<AlertEntry> {
        self.entries.iter().rev().take(count).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
