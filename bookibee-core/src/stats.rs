//! Word-tap counters.
//!
//! Counts are keyed by the lowercased word, monotonically non-decreasing
//! within a session unless explicitly reset, and persisted best-effort on
//! every change.

use crate::keys;
use crate::store::KeyValueStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Mapping from normalized word to tap count.
pub type WordCounts = BTreeMap<String, u32>;

/// Persistent tap counter over the key-value store.
pub struct TapCounter {
    store: Arc<dyn KeyValueStore>,
    counts: WordCounts,
}

impl TapCounter {
    /// Load counters from the store. An unreadable or unparsable entry
    /// falls back to empty with a warning.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let counts = match store.get(keys::WORD_COUNTS_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "discarding unparsable word counters");
                WordCounts::new()
            }),
            None => WordCounts::new(),
        };

        Self { store, counts }
    }

    /// Record a tap and return the word's new count.
    pub fn record_tap(&mut self, word: &str) -> u32 {
        let normalized = word.to_lowercase();
        let count = self.counts.entry(normalized).or_insert(0);
        *count += 1;
        let count = *count;
        self.persist();
        count
    }

    pub fn count(&self, word: &str) -> u32 {
        self.counts.get(&word.to_lowercase()).copied().unwrap_or(0)
    }

    pub fn counts(&self) -> &WordCounts {
        &self.counts
    }

    /// Clear all counters, in memory and in the store.
    pub fn reset(&mut self) {
        self.counts.clear();
        self.persist();
    }

    fn persist(&self) {
        match serde_json::to_string(&self.counts) {
            Ok(raw) => {
                if let Err(e) = self.store.set(keys::WORD_COUNTS_KEY, &raw) {
                    warn!(error = %e, "failed to persist word counters");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize word counters"),
        }
    }
}
