use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    db::{KeyValueStore, StorageKey},
    models::{HistoryEntry, HistoryEntryInput, MAX_HISTORY_ITEMS},
};

/// Source of visit timestamps
pub trait Clock: Send + Sync {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persistence {
    /// `load()` has not finished; nothing is written yet
    Pending,
    Active,
    /// A storage call failed; the history lives in memory from here on
    Disabled,
}

/// Bounded, deduplicated, most-recent-first log of viewed articles
///
/// The collection is persisted as one JSON array under a single key.
/// Storage failures are logged and never surface to callers: a failed read
/// starts the history empty, a failed write keeps the history in memory for
/// the rest of this instance's life.
pub struct ReadingHistory {
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    key: StorageKey,
    entries: Vec<HistoryEntry>,
    persistence: Persistence,
    loaded: bool,
}

impl ReadingHistory {
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, key: StorageKey) -> Self {
        Self {
            storage,
            clock,
            key,
            entries: Vec::new(),
            persistence: Persistence::Pending,
            loaded: false,
        }
    }

    /// Entries, most recent first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<HistoryEntry> {
        self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinguishes "not loaded yet" from "loaded and empty"
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Reads the persisted history, replacing the in-memory collection
    ///
    /// A missing or malformed record yields an empty history.
    pub async fn load(&mut self) {
        match self.storage.get(&self.key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(entries) => {
                    self.entries = normalize(entries);
                    self.persistence = Persistence::Active;
                }
                Err(e) => {
                    tracing::warn!(
                        key = %self.key,
                        error = %e,
                        "Malformed reading history in storage, starting empty"
                    );
                    self.entries.clear();
                    self.persistence = Persistence::Active;
                }
            },
            Ok(None) => {
                self.entries.clear();
                self.persistence = Persistence::Active;
            }
            Err(e) => {
                tracing::error!(
                    key = %self.key,
                    backend = self.storage.name(),
                    error = %e,
                    "Failed to read reading history, continuing in memory"
                );
                self.entries.clear();
                self.persistence = Persistence::Disabled;
            }
        }

        self.loaded = true;
        tracing::debug!(key = %self.key, entries = self.entries.len(), "Reading history loaded");
    }

    /// Records a visit to an article
    ///
    /// Revisiting refreshes the existing entry's timestamp only. Inputs with an
    /// empty id are ignored.
    pub async fn add(&mut self, input: HistoryEntryInput) {
        if input.id.is_empty() {
            return;
        }

        let now = self.clock.now_millis();

        let existing = self.entries.iter().position(|e| e.id == input.id);

        // Front first, then a stable sort: the visit wins same-millisecond
        // ties, and stored timestamps ahead of this clock keep their place.
        if let Some(index) = existing {
            let mut entry = self.entries.remove(index);
            entry.timestamp = now;
            self.entries.insert(0, entry);
        } else {
            self.entries.insert(0, input.into_entry(now));
        }
        sort_most_recent_first(&mut self.entries);
        self.entries.truncate(MAX_HISTORY_ITEMS);

        self.persist().await;
    }

    /// Removes the entry for `id` if present
    pub async fn remove(&mut self, id: &str) {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);

        if self.entries.len() != before {
            self.persist().await;
        }
    }

    /// Empties the history and deletes the persisted record
    pub async fn clear(&mut self) {
        self.entries.clear();

        if self.persistence == Persistence::Disabled {
            return;
        }

        if let Err(e) = self.storage.delete(&self.key).await {
            self.disable_persistence(&e);
        }
    }

    async fn persist(&mut self) {
        if !self.loaded || self.persistence != Persistence::Active {
            return;
        }

        // An emptied history has no record, same as after clear()
        let result = if self.entries.is_empty() {
            self.storage.delete(&self.key).await
        } else {
            match serde_json::to_string(&self.entries) {
                Ok(json) => self.storage.set(&self.key, json).await,
                Err(e) => Err(e.into()),
            }
        };

        if let Err(e) = result {
            self.disable_persistence(&e);
        }
    }

    fn disable_persistence(&mut self, error: &crate::error::AppError) {
        tracing::error!(
            key = %self.key,
            backend = self.storage.name(),
            error = %error,
            "Failed to write reading history, continuing in memory"
        );
        self.persistence = Persistence::Disabled;
    }
}

/// Restores the collection invariants on data read back from storage
fn normalize(mut entries: Vec<HistoryEntry>) -> Vec<HistoryEntry> {
    entries.retain(|e| !e.id.is_empty());
    sort_most_recent_first(&mut entries);

    let mut seen = HashSet::new();
    entries.retain(|e| seen.insert(e.id.clone()));
    entries.truncate(MAX_HISTORY_ITEMS);
    entries
}

fn sort_most_recent_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}
