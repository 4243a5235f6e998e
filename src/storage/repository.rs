//! Persistence for the calculator's answer, memory and history.

use super::KeyValueStore;
use crate::calculator::{HistoryEntry, HistoryLog, MemoryBank};
use crate::error::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::sync::Arc;

const ANSWER_KEY: &str = "answer";
const MEMORY_KEY: &str = "memory";
const HISTORY_KEY: &str = "history";

/// Owns the storage keys of the calculator feature.
///
/// Built once per process and handed to whoever needs it; cloning shares
/// the underlying store.
#[derive(Clone)]
pub struct CalculatorRepository {
    store: Arc<dyn KeyValueStore>,
}

impl CalculatorRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load_answer(&self) -> Result<Option<String>, StoreError> {
        self.store.get(ANSWER_KEY)
    }

    pub fn save_answer(&self, value: &str) -> Result<(), StoreError> {
        self.store.set(ANSWER_KEY, value)
    }

    pub fn load_memory(&self) -> Result<Option<MemoryBank>, StoreError> {
        let map: Option<BTreeMap<String, String>> = self.load_json(MEMORY_KEY)?;
        Ok(map.map(|map| MemoryBank::from_map(&map)))
    }

    pub fn save_memory(&self, memory: &MemoryBank) -> Result<(), StoreError> {
        self.save_json(MEMORY_KEY, &memory.to_map())
    }

    pub fn load_history(&self) -> Result<Option<HistoryLog>, StoreError> {
        let entries: Option<Vec<HistoryEntry>> = self.load_json(HISTORY_KEY)?;
        Ok(entries.map(HistoryLog::from_entries))
    }

    pub fn save_history(&self, history: &HistoryLog) -> Result<(), StoreError> {
        self.save_json(HISTORY_KEY, history.entries())
    }

    fn load_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            })
    }

    fn save_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value).map_err(|source| StoreError::Encode {
            key: key.to_string(),
            source,
        })?;
        self.store.set(key, &raw)
    }
}
