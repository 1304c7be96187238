//! Storage Layer
//!
//! Key-value persistence behind an object-safe trait, decoupling the
//! aggregation logic from any concrete medium. The in-memory store is the
//! default backend; anything that can get/put strings can replace it.

mod memory;

pub use memory::MemoryStore;

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Backend error: {0}")]
    Backend(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Minimal key-value store surface.
///
/// Writes replace the whole value for a key; there is no partial update,
/// so callers never need a locking discipline beyond replace-on-write.
pub trait KvStore: Send + Sync {
    /// Read a value, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write (or replace) a value.
    fn put(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove a key. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// All stored keys, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

/// Read and deserialize a JSON document.
///
/// An absent key resolves to `None`; a corrupt document is a
/// serialization error for the caller to degrade on.
pub fn get_json<T: DeserializeOwned>(
    store: &dyn KvStore,
    key: &str,
) -> Result<Option<T>, StorageError> {
    match store.get(key)? {
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string())),
        None => Ok(None),
    }
}

/// Serialize and write a JSON document.
pub fn put_json<T: Serialize>(
    store: &dyn KvStore,
    key: &str,
    value: &T,
) -> Result<(), StorageError> {
    let raw =
        serde_json::to_string(value).map_err(|e| StorageError::Serialization(e.to_string()))?;
    store.put(key, &raw)
}
