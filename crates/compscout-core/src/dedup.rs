//! # Dedup Store
//!
//! In-memory set of already-persisted (activity, team) keys.
//!
//! Seeded once from the sample store, then grows monotonically for the life
//! of the process. Not synchronized: the crawl driver is the single writer.

use crate::DedupKey;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default)]
pub struct DedupStore {
    keys: BTreeSet<DedupKey>,
}

impl DedupStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from keys recovered from the sample store.
    #[must_use]
    pub fn seeded<I: IntoIterator<Item = DedupKey>>(keys: I) -> Self {
        Self {
            keys: keys.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn seen(&self, key: &DedupKey) -> bool {
        self.keys.contains(key)
    }

    /// Record a key. Returns `false` if it was already present.
    pub fn record(&mut self, key: DedupKey) -> bool {
        self.keys.insert(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
