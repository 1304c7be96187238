//! In-memory key-value store

use crate::{KvStore, StorageError};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;

/// In-memory `KvStore` backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StorageError> {
        self.entries
            .lock()
            .map_err(|e| StorageError::Backend(format!("Lock error: {}", e)))
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StorageError> {
        debug!(key, bytes = value.len(), "storing document");
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_get_remove() {
        let store = MemoryStore::new();

        store.put("daily_2026-08-06", "{}").unwrap();
        assert_eq!(
            store.get("daily_2026-08-06").unwrap(),
            Some("{}".to_string())
        );

        store.remove("daily_2026-08-06").unwrap();
        assert_eq!(store.get("daily_2026-08-06").unwrap(), None);
    }

    #[test]
    fn test_put_replaces_whole_value() {
        let store = MemoryStore::new();
        store.put("k", "old").unwrap();
        store.put("k", "new").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("new".to_string()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_keys_lists_everything() {
        let store = MemoryStore::new();
        store.put("a", "1").unwrap();
        store.put("b", "2").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);
    }
}
