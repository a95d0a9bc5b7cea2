use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use thiserror::Error;

/// Errors produced by storage backends.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StorageError {
    /// Backend could not be reached (lock poisoned, file unreadable, quota).
    #[error("storage unavailable: {reason}")]
    Unavailable { reason: String },
    /// Backend contents could not be parsed.
    #[error("storage corrupted: {reason}")]
    Corrupted { reason: String },
}

/// Opaque string-keyed, string-valued durable map, modeled on browser `localStorage`.
///
/// Operations are synchronous and run on the caller's turn. Implementations use
/// interior mutability so a backend can be shared behind `Arc`.
pub trait StorageBackend: Send + Sync {
    /// Read the raw value stored under `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, overwriting any existing value.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key` (idempotent).
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// List every raw key currently stored.
    fn keys(&self) -> Result<Vec<String>, StorageError>;
}

impl<T: StorageBackend + ?Sized> StorageBackend for Arc<T> {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        (**self).keys()
    }
}

/// In-memory backend for tests and ephemeral runs. Clones share the same map.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStorage {
    inner: Arc<Mutex<BTreeMap<String, String>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for InMemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut map = self.inner.lock().map_err(poisoned)?;
        map.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let map = self.inner.lock().map_err(poisoned)?;
        Ok(map.keys().cloned().collect())
    }
}

fn poisoned<E: std::fmt::Display>(err: E) -> StorageError {
    StorageError::Unavailable {
        reason: format!("lock poisoned: {err}"),
    }
}
