//! Bounded history of applied parameter sets.
//!
//! Each successful render is recorded with the asset it produced so it can be
//! replayed later without going back to the renderer. Entries are kept
//! most-recent-first and the oldest one is dropped once the list is full.

use chrono::Local;
use serde::Serialize;

use crate::params::ParameterSet;

/// Default number of entries kept.
pub const DEFAULT_CAPACITY: usize = 5;

/// Errors raised by history lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HistoryError {
    #[error("History index {index} out of range ({len} entries)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// One rendered result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    asset_reference: String,
    timestamp: String,
    parameters: ParameterSet,
}

impl HistoryEntry {
    /// Opaque reference returned by the renderer
    pub fn asset_reference(&self) -> &str {
        &self.asset_reference
    }

    /// Local wall-clock time the entry was recorded, `HH:MM:SS`
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    pub fn parameters(&self) -> &ParameterSet {
        &self.parameters
    }
}

/// Most-recent-first list of rendered results.
#[derive(Debug, Clone)]
pub struct ParameterHistory {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl Default for ParameterHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ParameterHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, most recent first.
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Records a rendered result at the front, evicting the oldest beyond capacity.
    pub fn record(&mut self, asset_reference: impl Into<String>, parameters: ParameterSet) {
        let timestamp = Local::now().format("%H:%M:%S").to_string();
        self.push(HistoryEntry {
            asset_reference: asset_reference.into(),
            timestamp,
            parameters,
        });
    }

    fn push(&mut self, entry: HistoryEntry) {
        tracing::info!("History entry recorded: {}", entry.asset_reference);
        self.entries.insert(0, entry);

        if self.entries.len() > self.capacity {
            for evicted in self.entries.drain(self.capacity..) {
                tracing::debug!("Evicted history entry: {}", evicted.asset_reference);
            }
        }
    }

    /// Looks up an entry for replay. Never mutates the history.
    ///
    /// # Errors
    /// - If `index` is outside the current list
    pub fn replay(&self, index: usize) -> Result<&HistoryEntry, HistoryError> {
        self.entries.get(index).ok_or(HistoryError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Display label, `Version N`, where the oldest kept entry has the lowest number.
    pub fn version_label(&self, index: usize) -> Option<String> {
        if index >= self.entries.len() {
            return None;
        }
        Some(format!("Version {}", self.entries.len() - index))
    }
}
