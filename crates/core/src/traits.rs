//! Core traits for storage abstraction
//!
//! This module defines the [`VersionedStore`] trait: the per-key storage
//! engine the batch engine validates against and applies to. Swapping the
//! in-memory reference store for a persistent one does not affect the
//! layers above.

use crate::entry::Entry;
use crate::error::Result;
use crate::types::{Key, VersionTag};

/// Outcome of a conditional single-key write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The write was applied
    Applied,
    /// The expected version did not match; nothing was written
    VersionMismatch {
        /// Version stored at the time of the check (`None` = absent)
        current: Option<VersionTag>,
    },
}

impl WriteOutcome {
    /// True if the write was applied
    pub fn is_applied(&self) -> bool {
        matches!(self, WriteOutcome::Applied)
    }
}

/// One write of an already-validated batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchWrite {
    /// Store the entry, overwriting key, value and version
    Put(Entry),
    /// Remove the entry if present
    Delete(Key),
}

impl BatchWrite {
    /// Key this write touches
    pub fn key(&self) -> &Key {
        match self {
            BatchWrite::Put(entry) => &entry.key,
            BatchWrite::Delete(key) => key,
        }
    }
}

/// Key → (value, version, metadata) store with version-checked writes
///
/// Contract:
/// - A non-forced write succeeds only if the supplied expected version
///   equals the stored version; `None` expects the key to be absent.
/// - A forced write skips the check.
/// - An entry written without a version is stored with
///   [`VersionTag::empty`], so an existing entry never reads as absent.
/// - [`apply_batch`](VersionedStore::apply_batch) is all-or-nothing: on
///   error the store is left exactly as it was.
///
/// Thread safety: all methods must be safe to call concurrently from
/// multiple threads (requires Send + Sync).
pub trait VersionedStore: Send + Sync {
    /// Get the entry stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get(&self, key: &Key) -> Result<Option<Entry>>;

    /// Get only the version stored under `key`
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn get_version(&self, key: &Key) -> Result<Option<VersionTag>> {
        Ok(self
            .get(key)?
            .map(|entry| entry.metadata.version.unwrap_or_default()))
    }

    /// Store `entry` if `expected` matches the stored version (or `forced`)
    ///
    /// The entry's own metadata version becomes the new stored version.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails. A version mismatch
    /// is not an error; it is reported through [`WriteOutcome`].
    fn conditional_put(
        &self,
        entry: Entry,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome>;

    /// Remove `key` if `expected` matches the stored version (or `forced`)
    ///
    /// A forced delete of an absent key is applied as a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails.
    fn conditional_delete(
        &self,
        key: &Key,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome>;

    /// Apply validated writes atomically, in order
    ///
    /// Later writes to the same key win. Readers must never observe a
    /// prefix of the batch.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage operation fails, in which case no
    /// write of the batch is visible.
    fn apply_batch(&self, writes: &[BatchWrite]) -> Result<()>;
}
