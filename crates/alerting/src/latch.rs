//! Per-key one-shot alert latching

use std::collections::HashSet;
use tracing::debug;

/// Keyed one-shot latch for edge-triggered alerts.
///
/// A key fires at most once until it is released: an away episode latches
/// its duration alerts for the whole episode, a very-low focus warning
/// stays latched until the level recovers. Keys are caller-defined strings
/// (typically `"<subject-id>/<kind>"`).
#[derive(Debug, Default, Clone)]
pub struct AlertLatch {
    latched: HashSet<String>,
}

impl AlertLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attempt to fire a key. Returns `true` only the first time between
    /// releases; repeated calls while latched return `false`.
    pub fn fire(&mut self, key: &str) -> bool {
        if self.latched.contains(key) {
            return false;
        }
        debug!(key, "alert latch fired");
        self.latched.insert(key.to_string());
        true
    }

    /// Re-arm a key so it may fire again.
    pub fn release(&mut self, key: &str) {
        if self.latched.remove(key) {
            debug!(key, "alert latch released");
        }
    }

    /// Whether a key is currently latched.
    pub fn is_latched(&self, key: &str) -> bool {
        self.latched.contains(key)
    }

    /// Drop every latch whose key starts with the given prefix. Used when
    /// a subject leaves the registry.
    pub fn release_prefix(&mut self, prefix: &str) {
        self.latched.retain(|key| !key.starts_with(prefix));
    }

    /// Drop all latches.
    pub fn clear(&mut self) {
        self.latched.clear();
    }
}
