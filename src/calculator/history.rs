//! Recent calculations, newest first.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Maximum number of entries kept.
pub const HISTORY_CAPACITY: usize = 10;

/// A committed calculation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in milliseconds, as a string.
    pub id: String,
    /// The buffer text at commit time.
    pub expression: String,
    /// The result at commit time, empty if evaluation failed.
    pub result: String,
}

/// Capacity-bounded commit log. Entries are never edited or removed
/// individually; they age out when newer commits push them past the cap.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a log from persisted entries, enforcing the cap.
    pub fn from_entries(mut entries: Vec<HistoryEntry>) -> Self {
        entries.truncate(HISTORY_CAPACITY);
        Self { entries }
    }

    /// Prepend a new entry and drop whatever falls past the cap.
    pub fn append(&mut self, expression: &str, result: &str) -> &HistoryEntry {
        let entry = HistoryEntry {
            id: self.next_id(),
            expression: expression.to_string(),
            result: result.to_string(),
        };

        self.entries.insert(0, entry);
        self.entries.truncate(HISTORY_CAPACITY);
        &self.entries[0]
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Entry by position, 0 being the newest.
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Wall-clock milliseconds, bumped past the newest id when two commits
    /// land in the same millisecond.
    fn next_id(&self) -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();

        let newest = self
            .entries
            .first()
            .and_then(|entry| entry.id.parse::<u128>().ok());

        match newest {
            Some(newest) if newest >= now => (newest + 1).to_string(),
            _ => now.to_string(),
        }
    }
}
