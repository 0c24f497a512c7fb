//! InMemoryStore: reference VersionedStore backed by a BTreeMap
//!
//! This module implements the VersionedStore trait using:
//! - `BTreeMap<Key, Entry>` for ordered key storage
//! - `parking_lot::RwLock` for thread-safe access
//!
//! # Design Notes
//!
//! - **No version history**: Each key stores only its latest entry
//! - **Check and write under one lock**: conditional writes compare and
//!   mutate while holding the write lock, so no other writer can slip in
//!   between the version check and the write
//! - **Batch under one lock**: `apply_batch` holds the write lock for the
//!   whole batch; readers see either none or all of it

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use kvdrive_core::{
    version_matches, BatchWrite, Entry, Key, Result, VersionTag, VersionedStore, WriteOutcome,
};

use crate::snapshot::StoreSnapshot;

/// Give unversioned entries the empty tag so they never read as absent
fn normalize(mut entry: Entry) -> Entry {
    if entry.metadata.version.is_none() {
        entry.metadata.version = Some(VersionTag::empty());
    }
    entry
}

/// In-memory versioned store
///
/// Thread-safe through `parking_lot::RwLock`.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// Ordered map from Key to its current Entry
    data: RwLock<BTreeMap<Key, Entry>>,
    /// Number of mutations applied (puts, deletes, batch writes)
    mutations: AtomicU64,
}

impl InMemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `entries`
    pub fn with_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        let data = entries
            .into_iter()
            .map(|entry| (entry.key.clone(), normalize(entry)))
            .collect();
        Self {
            data: RwLock::new(data),
            mutations: AtomicU64::new(0),
        }
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// True if the store holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Number of mutations applied since creation
    pub fn mutation_count(&self) -> u64 {
        self.mutations.load(Ordering::Relaxed)
    }

    /// Create a snapshot of the current state
    ///
    /// Deep-clones the map under the read lock, so the snapshot never
    /// contains part of a batch.
    pub fn snapshot(&self) -> StoreSnapshot {
        let data = self.data.read();
        StoreSnapshot::new(data.clone())
    }

    /// All keys in order
    pub fn keys(&self) -> Vec<Key> {
        self.data.read().keys().cloned().collect()
    }
}

impl VersionedStore for InMemoryStore {
    fn get(&self, key: &Key) -> Result<Option<Entry>> {
        Ok(self.data.read().get(key).cloned())
    }

    fn get_version(&self, key: &Key) -> Result<Option<VersionTag>> {
        Ok(self
            .data
            .read()
            .get(key)
            .and_then(|entry| entry.metadata.version.clone()))
    }

    fn conditional_put(
        &self,
        entry: Entry,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome> {
        let mut data = self.data.write();

        if !forced {
            let current = data.get(&entry.key).and_then(|e| e.version());
            if !version_matches(expected, current) {
                return Ok(WriteOutcome::VersionMismatch {
                    current: current.cloned(),
                });
            }
        }

        data.insert(entry.key.clone(), normalize(entry));
        self.mutations.fetch_add(1, Ordering::Relaxed);
        Ok(WriteOutcome::Applied)
    }

    fn conditional_delete(
        &self,
        key: &Key,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome> {
        let mut data = self.data.write();

        if !forced {
            let current = data.get(key).and_then(|e| e.version());
            if !version_matches(expected, current) {
                return Ok(WriteOutcome::VersionMismatch {
                    current: current.cloned(),
                });
            }
        }

        if data.remove(key).is_some() {
            self.mutations.fetch_add(1, Ordering::Relaxed);
        }
        Ok(WriteOutcome::Applied)
    }

    fn apply_batch(&self, writes: &[BatchWrite]) -> Result<()> {
        // One lock acquisition for the entire batch
        let mut data = self.data.write();

        for write in writes {
            match write {
                BatchWrite::Put(entry) => {
                    data.insert(entry.key.clone(), normalize(entry.clone()));
                }
                BatchWrite::Delete(key) => {
                    data.remove(key);
                }
            }
        }

        self.mutations
            .fetch_add(writes.len() as u64, Ordering::Relaxed);
        tracing::trace!(target: "kvdrive::storage", writes = writes.len(), "Batch applied");
        Ok(())
    }
}
