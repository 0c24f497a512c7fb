//! Reference model for tracking expected store state
//!
//! The reference model keeps a plain map of what the store should contain
//! after a sequence of committed batches, independent of any locking or
//! engine logic.
//!
//! # Example
//!
//! ```ignore
//! use kvdrive_storage::testing::ReferenceModel;
//!
//! let mut model = ReferenceModel::new();
//! model.apply(&[BatchWrite::Put(Entry::versioned("foo", "v", "1"))]);
//!
//! let mismatches = model.compare(&store.snapshot());
//! assert!(mismatches.is_empty());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use kvdrive_core::{BatchWrite, Entry, Key, VersionTag};

use crate::snapshot::StoreSnapshot;

/// Expected store state
#[derive(Debug, Clone, Default)]
pub struct ReferenceModel {
    entries: BTreeMap<Key, Entry>,
}

/// Difference between the model and an actual snapshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateMismatch {
    /// Key expected but absent
    Missing {
        /// Missing key
        key: Key,
    },
    /// Key present but not expected
    Unexpected {
        /// Unexpected key
        key: Key,
    },
    /// Key present with different value or metadata
    Different {
        /// Differing key
        key: Key,
        /// Expected entry
        expected: Box<Entry>,
        /// Actual entry
        actual: Box<Entry>,
    },
}

impl ReferenceModel {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the model from an existing snapshot
    pub fn from_snapshot(snapshot: &StoreSnapshot) -> Self {
        Self {
            entries: snapshot
                .iter()
                .map(|(k, e)| (k.clone(), e.clone()))
                .collect(),
        }
    }

    /// Apply committed writes in order
    pub fn apply(&mut self, writes: &[BatchWrite]) {
        for write in writes {
            match write {
                BatchWrite::Put(entry) => {
                    let mut entry = entry.clone();
                    if entry.metadata.version.is_none() {
                        entry.metadata.version = Some(VersionTag::empty());
                    }
                    self.entries.insert(entry.key.clone(), entry);
                }
                BatchWrite::Delete(key) => {
                    self.entries.remove(key);
                }
            }
        }
    }

    /// Version the model expects for `key`
    pub fn version_of(&self, key: &Key) -> Option<&VersionTag> {
        self.entries.get(key).and_then(|e| e.version())
    }

    /// Number of expected entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no entries are expected
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare against an actual snapshot
    ///
    /// Returns every mismatch in key order; empty means identical.
    pub fn compare(&self, actual: &StoreSnapshot) -> Vec<StateMismatch> {
        let keys: BTreeSet<&Key> = self
            .entries
            .keys()
            .chain(actual.iter().map(|(k, _)| k))
            .collect();

        keys.into_iter()
            .filter_map(|key| match (self.entries.get(key), actual.get(key)) {
                (Some(_), None) => Some(StateMismatch::Missing { key: key.clone() }),
                (None, Some(_)) => Some(StateMismatch::Unexpected { key: key.clone() }),
                (Some(e), Some(a)) if e != a => Some(StateMismatch::Different {
                    key: key.clone(),
                    expected: Box::new(e.clone()),
                    actual: Box::new(a.clone()),
                }),
                _ => None,
            })
            .collect()
    }
}
