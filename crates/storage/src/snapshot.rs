//! StoreSnapshot: point-in-time copy of the in-memory store
//!
//! # Design Notes
//!
//! - **Deep clone**: Expensive but simple (full BTreeMap copy)
//! - **Immutable**: Once created, the snapshot never changes
//! - **Thread-safe**: Can be shared across threads (Arc-wrapped data)
//! - **Comparable**: Two snapshots are equal iff they hold byte-identical
//!   entries, which is how atomicity is checked in tests

use std::collections::BTreeMap;
use std::sync::Arc;

use kvdrive_core::{Entry, Key, VersionTag};

/// Immutable point-in-time view of a store
///
/// # Example
///
/// ```ignore
/// let store = InMemoryStore::new();
/// let before = store.snapshot();
///
/// // Writes after snapshot creation are not visible
/// store.conditional_put(entry, None, true)?;
/// assert!(before.get(&key).is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSnapshot {
    data: Arc<BTreeMap<Key, Entry>>,
}

impl StoreSnapshot {
    /// Create a snapshot taking ownership of `data`
    ///
    /// This is typically called by `InMemoryStore::snapshot()`, not directly.
    pub fn new(data: BTreeMap<Key, Entry>) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Create an empty snapshot
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    /// Entry stored under `key` at snapshot time
    pub fn get(&self, key: &Key) -> Option<&Entry> {
        self.data.get(key)
    }

    /// Version stored under `key` at snapshot time
    pub fn version_of(&self, key: &Key) -> Option<&VersionTag> {
        self.data.get(key).and_then(|entry| entry.version())
    }

    /// Number of entries in the snapshot
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the snapshot holds no entries
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Entry)> {
        self.data.iter()
    }
}
