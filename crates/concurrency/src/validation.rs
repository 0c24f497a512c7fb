//! Commit-time validation of staged operations
//!
//! Validation is a pure function of a version snapshot and the ledger:
//! - Every non-forced operation is checked against the store state as of
//!   commit start, never against earlier operations in the same ledger
//! - Forced operations never conflict
//! - An expected version of `None` matches only an absent key
//! - All conflicts are collected; the batch commits only if there are none

use std::collections::BTreeMap;

use kvdrive_core::{
    version_matches, InvalidBatchDetail, Key, Result, TransactionId, VersionTag, VersionedStore,
};

use crate::ledger::StagedOperation;

/// Versions of the keys a ledger depends on, captured at commit start
///
/// Keys missing from the snapshot read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionSnapshot {
    versions: BTreeMap<Key, Option<VersionTag>>,
}

impl VersionSnapshot {
    /// Create an empty snapshot
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the version observed for `key`
    pub fn insert(&mut self, key: Key, version: Option<VersionTag>) {
        self.versions.insert(key, version);
    }

    /// Version observed for `key`
    pub fn version_of(&self, key: &Key) -> Option<&VersionTag> {
        self.versions.get(key).and_then(Option::as_ref)
    }

    /// True if `key` was captured
    pub fn contains(&self, key: &Key) -> bool {
        self.versions.contains_key(key)
    }

    /// Number of captured keys
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// True if no key was captured
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }
}

impl FromIterator<(Key, Option<VersionTag>)> for VersionSnapshot {
    fn from_iter<I: IntoIterator<Item = (Key, Option<VersionTag>)>>(iter: I) -> Self {
        Self {
            versions: iter.into_iter().collect(),
        }
    }
}

/// Read the current version of every key a non-forced operation checks
///
/// Each distinct key is read once. The caller must hold the write gate so
/// the snapshot stays current until the batch is applied.
pub fn capture_snapshot<S: VersionedStore + ?Sized>(
    store: &S,
    operations: &[StagedOperation],
) -> Result<VersionSnapshot> {
    let mut snapshot = VersionSnapshot::new();
    for op in operations.iter().filter(|op| !op.is_forced()) {
        if !snapshot.contains(op.key()) {
            let version = store.get_version(op.key())?;
            snapshot.insert(op.key().clone(), version);
        }
    }
    Ok(snapshot)
}

/// A staged operation whose expected version did not match
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConflict {
    /// Position of the operation in the ledger
    pub index: usize,
    /// Key of the operation
    pub key: Key,
    /// Version the operation expected
    pub expected: Option<VersionTag>,
    /// Version in the snapshot
    pub current: Option<VersionTag>,
}

/// Result of ledger validation
///
/// Accumulates all conflicts found during validation, in ledger order.
/// A batch commits only if is_valid() returns true.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    /// All conflicts detected during validation
    pub conflicts: Vec<VersionConflict>,
}

impl ValidationResult {
    /// Create a successful validation result (no conflicts)
    pub fn ok() -> Self {
        Self::default()
    }

    /// Check if validation passed (no conflicts)
    pub fn is_valid(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Get the number of conflicts
    pub fn conflict_count(&self) -> usize {
        self.conflicts.len()
    }

    /// First conflict in ledger order
    pub fn first(&self) -> Option<&VersionConflict> {
        self.conflicts.iter().min_by_key(|c| c.index)
    }

    /// Diagnostic detail for an invalid batch; `None` if valid
    pub fn to_detail(&self, id: TransactionId) -> Option<InvalidBatchDetail> {
        self.first().map(|first| InvalidBatchDetail {
            id,
            failing_key: first.key.clone(),
            failing_index: first.index,
            expected: first.expected.clone(),
            current: first.current.clone(),
            conflict_count: self.conflict_count(),
        })
    }
}

/// Validate every staged operation against `snapshot`
pub fn validate_ledger(snapshot: &VersionSnapshot, operations: &[StagedOperation]) -> ValidationResult {
    let mut result = ValidationResult::ok();

    for (index, op) in operations.iter().enumerate() {
        if op.is_forced() {
            continue;
        }
        let current = snapshot.version_of(op.key());
        if !version_matches(op.expected(), current) {
            result.conflicts.push(VersionConflict {
                index,
                key: op.key().clone(),
                expected: op.expected().cloned(),
                current: current.cloned(),
            });
        }
    }

    result
}
