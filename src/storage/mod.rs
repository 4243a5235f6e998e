//! Local key-value storage.
//!
//! Values are plain strings; structured values are JSON-encoded by the
//! [`CalculatorRepository`] before they reach the store.

mod file;
mod repository;

pub use file::FileStore;
pub use repository::CalculatorRepository;

use crate::error::StoreError;
use std::collections::HashMap;
use std::sync::Mutex;

/// A string-to-string store that survives the process (or not, for tests).
pub trait KeyValueStore: Send + Sync {
    /// Read a key. `Ok(None)` means it was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a key, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Process-local store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
