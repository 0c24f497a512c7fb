//! Batch ledger: the ordered operations staged under one transaction
//!
//! A ledger is created by `begin`, grows through staging calls from its
//! owning connection, and is resolved exactly once:
//!
//! ```text
//! Open ──commit (all checks pass)──> Committed
//!   │
//!   └──commit (any check fails) / abort / disconnect──> Aborted
//! ```
//!
//! Staging never touches the store. Insertion order is commit order, so a
//! later operation on the same key overrides an earlier one when applied.

use chrono::{DateTime, Utc};

use kvdrive_core::{BatchWrite, ConnectionId, Entry, Key, TransactionId, VersionTag};

/// One staged write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedOperation {
    /// Store `entry`; its metadata version becomes the stored version
    Put {
        /// Entry to write
        entry: Entry,
        /// Version the key must currently have (`None` = must be absent)
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
    /// Remove `key`
    Delete {
        /// Key to remove
        key: Key,
        /// Version the key must currently have (`None` = must be absent)
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
}

impl StagedOperation {
    /// Key the operation targets
    pub fn key(&self) -> &Key {
        match self {
            StagedOperation::Put { entry, .. } => &entry.key,
            StagedOperation::Delete { key, .. } => key,
        }
    }

    /// Expected current version
    pub fn expected(&self) -> Option<&VersionTag> {
        match self {
            StagedOperation::Put { expected, .. } | StagedOperation::Delete { expected, .. } => {
                expected.as_ref()
            }
        }
    }

    /// True if the version check is skipped
    pub fn is_forced(&self) -> bool {
        match self {
            StagedOperation::Put { forced, .. } | StagedOperation::Delete { forced, .. } => *forced,
        }
    }

    /// The store write this operation becomes on commit
    pub fn to_write(&self) -> BatchWrite {
        match self {
            StagedOperation::Put { entry, .. } => BatchWrite::Put(entry.clone()),
            StagedOperation::Delete { key, .. } => BatchWrite::Delete(key.clone()),
        }
    }
}

/// Lifecycle state of a ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerState {
    /// Accepting staged operations
    Open,
    /// All operations applied
    Committed,
    /// Discarded without applying anything
    Aborted {
        /// Human-readable reason for abort
        reason: String,
    },
}

/// Counts of staged operations by kind
///
/// Shows what would be applied on commit, or discarded on abort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PendingOperations {
    /// Number of staged puts
    pub puts: usize,
    /// Number of staged deletes
    pub deletes: usize,
}

impl PendingOperations {
    /// Total number of staged operations
    pub fn total(&self) -> usize {
        self.puts + self.deletes
    }

    /// Check if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Ordered operations staged under one transaction id
#[derive(Debug, Clone)]
pub struct BatchLedger {
    id: TransactionId,
    owner: ConnectionId,
    operations: Vec<StagedOperation>,
    state: LedgerState,
    opened_at: DateTime<Utc>,
}

impl BatchLedger {
    /// Create an empty open ledger
    pub fn new(id: TransactionId, owner: ConnectionId) -> Self {
        Self {
            id,
            owner,
            operations: Vec::new(),
            state: LedgerState::Open,
            opened_at: Utc::now(),
        }
    }

    /// Transaction id
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Owning connection
    pub fn owner(&self) -> ConnectionId {
        self.owner
    }

    /// When `begin` created the ledger
    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Current state
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// True while staging is accepted
    pub fn is_open(&self) -> bool {
        self.state == LedgerState::Open
    }

    /// Staged operations in insertion order
    pub fn operations(&self) -> &[StagedOperation] {
        &self.operations
    }

    /// Number of staged operations
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// True if nothing is staged
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Append an operation
    ///
    /// Returns false without staging if the ledger is resolved.
    pub fn stage(&mut self, operation: StagedOperation) -> bool {
        if !self.is_open() {
            return false;
        }
        self.operations.push(operation);
        true
    }

    /// Staged operation counts by kind
    pub fn pending(&self) -> PendingOperations {
        self.operations
            .iter()
            .fold(PendingOperations::default(), |mut acc, op| {
                match op {
                    StagedOperation::Put { .. } => acc.puts += 1,
                    StagedOperation::Delete { .. } => acc.deletes += 1,
                }
                acc
            })
    }

    /// Store writes in ledger order
    pub fn to_writes(&self) -> Vec<BatchWrite> {
        self.operations.iter().map(StagedOperation::to_write).collect()
    }

    /// Open → Committed
    ///
    /// No effect on a resolved ledger.
    pub fn mark_committed(&mut self) {
        if self.is_open() {
            self.state = LedgerState::Committed;
        }
    }

    /// Open → Aborted, dropping staged operations
    ///
    /// No effect on a resolved ledger.
    pub fn mark_aborted(&mut self, reason: impl Into<String>) {
        if self.is_open() {
            self.state = LedgerState::Aborted {
                reason: reason.into(),
            };
            self.operations.clear();
        }
    }
}
