//! Key-value persistence backends for the entity store.
//!
//! DESIGN
//! ======
//! The store only needs get/set/remove of JSON values by string key. The
//! trait is async so a backend may suspend on I/O (extension storage is
//! promise-based); it is `?Send` because everything runs on the UI thread.
//!
//! ERROR HANDLING
//! ==============
//! Backends report failures as `StorageError`. Callers above the store
//! (the drop resolver) catch them and degrade to "the drag did not happen".

#[cfg(test)]
#[path = "storage_test.rs"]
mod storage_test;

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use serde_json::Value;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Async key-value persistence keyed by string identifiers.
#[async_trait::async_trait(?Send)]
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value stored under `key`.
    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError>;

    /// Delete `key`. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process backend. Used natively and as the test double.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<HashMap<String, Value>>,
    writes: Cell<usize>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls served so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    /// Copy of the raw value under `key`.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.entries.borrow().get(key).cloned()
    }

    /// All keys currently stored, sorted.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.borrow().keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait::async_trait(?Send)]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// `window.localStorage` backend. Values are stored as JSON strings.
#[cfg(feature = "browser")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(feature = "browser")]
impl LocalStore {
    /// Bind to the current window's local storage.
    ///
    /// # Errors
    ///
    /// Returns `Unavailable` outside a window context or when storage is disabled.
    pub fn from_window() -> Result<Self, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = window
            .local_storage()
            .map_err(js_error)?
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { storage })
    }
}

#[cfg(feature = "browser")]
#[async_trait::async_trait(?Send)]
impl KeyValueStore for LocalStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self.storage.get_item(key).map_err(js_error)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let raw = serde_json::to_string(&value)?;
        self.storage.set_item(key, &raw).map_err(js_error)
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage.remove_item(key).map_err(js_error)
    }
}

#[cfg(feature = "browser")]
fn js_error(err: impl std::fmt::Debug) -> StorageError {
    StorageError::Backend(format!("{err:?}"))
}
