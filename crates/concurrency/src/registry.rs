//! Registry of open batch ledgers
//!
//! Maps transaction ids to ledgers and connections to the id they own.
//! The registry also holds the device-wide batch slot: at most one ledger
//! is open at a time, so the slot holder is the owner of that ledger.
//!
//! Connections reported closed are remembered, so a request that was
//! already in flight when its connection closed cannot open a ledger
//! nobody will ever resolve.
//!
//! The registry does no locking of its own. The engine keeps it behind the
//! mutex that also serializes store writes.

use chrono::{DateTime, Utc};
use rustc_hash::{FxHashMap, FxHashSet};

use kvdrive_core::{ConflictReason, ConnectionId, TransactionId};

use crate::ledger::{BatchLedger, PendingOperations};

/// Summary of the open batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInfo {
    /// Transaction id
    pub id: TransactionId,
    /// Owning connection
    pub owner: ConnectionId,
    /// Number of staged operations
    pub operation_count: usize,
    /// Staged operations by kind
    pub pending: PendingOperations,
    /// When the batch was opened
    pub opened_at: DateTime<Utc>,
}

impl From<&BatchLedger> for BatchInfo {
    fn from(ledger: &BatchLedger) -> Self {
        Self {
            id: ledger.id(),
            owner: ledger.owner(),
            operation_count: ledger.len(),
            pending: ledger.pending(),
            opened_at: ledger.opened_at(),
        }
    }
}

/// Open ledgers and their owners
#[derive(Debug, Default)]
pub struct BatchRegistry {
    ledgers: FxHashMap<TransactionId, BatchLedger>,
    by_connection: FxHashMap<ConnectionId, TransactionId>,
    slot: Option<ConnectionId>,
    closed: FxHashSet<ConnectionId>,
}

impl BatchRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Connection currently holding the batch slot
    pub fn slot_holder(&self) -> Option<ConnectionId> {
        self.slot
    }

    /// Open a ledger for `owner` and give it the batch slot
    ///
    /// Fails if `owner` already has an open ledger or another connection
    /// holds the slot.
    pub fn open(&mut self, owner: ConnectionId) -> Result<TransactionId, ConflictReason> {
        if let Some(id) = self.by_connection.get(&owner) {
            return Err(ConflictReason::ConnectionOwnsBatch {
                connection: owner,
                id: *id,
            });
        }
        if let Some(holder) = self.slot {
            return Err(ConflictReason::BatchInProgress { owner: holder });
        }

        let mut id = TransactionId::new();
        while self.ledgers.contains_key(&id) {
            id = TransactionId::new();
        }

        self.ledgers.insert(id, BatchLedger::new(id, owner));
        self.by_connection.insert(owner, id);
        self.slot = Some(owner);
        Ok(id)
    }

    /// Open ledger `id` if it belongs to `caller`
    pub fn ledger_mut(&mut self, id: TransactionId, caller: ConnectionId) -> Option<&mut BatchLedger> {
        self.ledgers
            .get_mut(&id)
            .filter(|ledger| ledger.owner() == caller && ledger.is_open())
    }

    /// Open ledger `id` if it belongs to `caller`
    pub fn ledger(&self, id: TransactionId, caller: ConnectionId) -> Option<&BatchLedger> {
        self.ledgers
            .get(&id)
            .filter(|ledger| ledger.owner() == caller && ledger.is_open())
    }

    /// Remove ledger `id` owned by `caller`, releasing the slot
    pub fn take(&mut self, id: TransactionId, caller: ConnectionId) -> Option<BatchLedger> {
        self.ledger(id, caller)?;
        self.remove(id)
    }

    /// Remove whatever ledger `connection` owns, releasing the slot
    pub fn take_by_connection(&mut self, connection: ConnectionId) -> Option<BatchLedger> {
        let id = *self.by_connection.get(&connection)?;
        self.remove(id)
    }

    /// Mark `connection` closed and remove whatever ledger it owns
    pub fn close(&mut self, connection: ConnectionId) -> Option<BatchLedger> {
        self.closed.insert(connection);
        self.take_by_connection(connection)
    }

    /// True once `connection` has been closed
    pub fn is_closed(&self, connection: ConnectionId) -> bool {
        self.closed.contains(&connection)
    }

    fn remove(&mut self, id: TransactionId) -> Option<BatchLedger> {
        let ledger = self.ledgers.remove(&id)?;
        self.by_connection.remove(&ledger.owner());
        if self.slot == Some(ledger.owner()) {
            self.slot = None;
        }
        Some(ledger)
    }

    /// Summary of the open batch, if any
    pub fn active(&self) -> Option<BatchInfo> {
        let holder = self.slot?;
        let id = self.by_connection.get(&holder)?;
        self.ledgers.get(id).map(BatchInfo::from)
    }

    /// Id of the ledger `connection` owns
    pub fn owned_by(&self, connection: ConnectionId) -> Option<TransactionId> {
        self.by_connection.get(&connection).copied()
    }

    /// Number of open ledgers
    pub fn len(&self) -> usize {
        self.ledgers.len()
    }

    /// True if no ledger is open
    pub fn is_empty(&self) -> bool {
        self.ledgers.is_empty()
    }
}
