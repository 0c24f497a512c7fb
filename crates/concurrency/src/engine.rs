//! Batch transaction engine
//!
//! Orchestrates begin, staging, commit and abort of batch ledgers, and
//! gates plain single-key writes against an open batch.
//!
//! ## Write Gate
//!
//! One mutex guards the [`BatchRegistry`]. Every store mutation happens
//! while it is held:
//! - commit holds it across snapshot capture, validation and apply
//! - single-key writes hold it across their conditional write
//!
//! Reads never take it. Since staged operations reach the store only on
//! commit, readers on any connection see pre-batch state until then.
//!
//! ## Commit Sequence
//!
//! ```text
//! 1. take ledger from registry (releases the batch slot)
//! 2. capture_snapshot() - versions of every key a non-forced op checks
//! 3. validate_ledger() - pure check of every op against the snapshot
//! 4. IF conflicts: ledger → Aborted, return InvalidBatch
//! 5. apply_batch() - all writes in ledger order, atomically
//! 6. ledger → Committed, return Committed
//! 7. drop gate, wake waiters
//! ```
//!
//! A storage failure in step 2 or 5 aborts the ledger and is returned as
//! an error. The store applies a batch atomically, so nothing from the
//! ledger is visible after such a failure.

use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, error, info, warn};

use kvdrive_core::{
    BatchStatus, ConflictReason, ConnectionId, Entry, Error, InvalidBatchDetail, Key, Result,
    TransactionId, VersionTag, VersionedStore, WriteOutcome,
};

use crate::config::{BatchConfig, WaitPolicy};
use crate::ledger::{BatchLedger, PendingOperations, StagedOperation};
use crate::metrics::{BatchMetrics, MetricsSnapshot};
use crate::registry::{BatchInfo, BatchRegistry};
use crate::validation::{capture_snapshot, validate_ledger};

/// A successfully applied batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    /// Committed batch
    pub id: TransactionId,
    /// Operations applied, by kind
    pub applied: PendingOperations,
}

/// Result of a commit that reached validation
///
/// `InvalidBatch` is an expected outcome, not an error: nothing was
/// written and the ledger is gone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every operation was applied
    Committed(CommitSummary),
    /// A version check failed; nothing was applied
    InvalidBatch(InvalidBatchDetail),
}

impl CommitOutcome {
    /// True if the batch was applied
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed(_))
    }
}

impl From<CommitOutcome> for BatchStatus {
    fn from(outcome: CommitOutcome) -> Self {
        match outcome {
            CommitOutcome::Committed(_) => BatchStatus::Committed,
            CommitOutcome::InvalidBatch(detail) => BatchStatus::InvalidBatch(detail),
        }
    }
}

/// A discarded batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbortSummary {
    /// Aborted batch
    pub id: TransactionId,
    /// Operations discarded, by kind
    pub discarded: PendingOperations,
}

/// Coordinates batch ledgers over a [`VersionedStore`]
pub struct BatchTransactionEngine<S: ?Sized> {
    config: BatchConfig,
    registry: Mutex<BatchRegistry>,
    /// Signalled whenever the batch slot is released
    slot_released: Condvar,
    metrics: BatchMetrics,
    store: Arc<S>,
}

impl<S: VersionedStore + ?Sized> BatchTransactionEngine<S> {
    /// Create an engine over `store`
    pub fn new(store: Arc<S>, config: BatchConfig) -> Self {
        Self {
            config,
            registry: Mutex::new(BatchRegistry::new()),
            slot_released: Condvar::new(),
            metrics: BatchMetrics::new(),
            store,
        }
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Engine configuration
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Current counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Summary of the open batch, if any
    pub fn active_batch(&self) -> Option<BatchInfo> {
        self.registry.lock().active()
    }

    /// Batch owned by `connection`, if any
    pub fn batch_of(&self, connection: ConnectionId) -> Option<TransactionId> {
        self.registry.lock().owned_by(connection)
    }

    // ========================================================================
    // Batch Lifecycle
    // ========================================================================

    /// Open a batch for `connection`
    ///
    /// Fails with a conflict if `connection` already owns a batch. If
    /// another connection owns one, fails or waits per the wait policy.
    pub fn begin(&self, connection: ConnectionId) -> Result<TransactionId> {
        let mut registry = self.registry.lock();
        let waited = self.wait_for_slot(&mut registry, connection);
        Self::ensure_live(&registry, connection)?;

        match waited.and_then(|()| registry.open(connection)) {
            Ok(id) => {
                self.metrics.record_begin();
                debug!(target: "kvdrive::batch", connection = %connection, txn_id = %id, "Batch opened");
                Ok(id)
            }
            Err(reason) => {
                warn!(target: "kvdrive::batch", connection = %connection, reason = %reason, "Begin rejected");
                Err(Error::Conflict(reason))
            }
        }
    }

    /// Stage a put into batch `id`
    ///
    /// The store is not touched; the version check runs at commit.
    pub fn stage_put(
        &self,
        connection: ConnectionId,
        id: TransactionId,
        entry: Entry,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.config.limits.validate_entry(&entry)?;
        self.config.limits.validate_expected(expected.as_ref())?;
        self.stage(
            connection,
            id,
            StagedOperation::Put {
                entry,
                expected,
                forced,
            },
        )
    }

    /// Stage a delete into batch `id`
    pub fn stage_delete(
        &self,
        connection: ConnectionId,
        id: TransactionId,
        key: Key,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.config.limits.validate_key(&key)?;
        self.config.limits.validate_expected(expected.as_ref())?;
        self.stage(
            connection,
            id,
            StagedOperation::Delete {
                key,
                expected,
                forced,
            },
        )
    }

    fn stage(&self, connection: ConnectionId, id: TransactionId, op: StagedOperation) -> Result<()> {
        let mut registry = self.registry.lock();
        let ledger = registry
            .ledger_mut(id, connection)
            .ok_or(Error::BatchNotFound { id })?;

        if ledger.len() >= self.config.max_operations_per_batch {
            return Err(Error::invalid_request(format!(
                "batch {} already holds the maximum of {} operations",
                id, self.config.max_operations_per_batch
            )));
        }

        let key = op.key().clone();
        let staged = ledger.stage(op);
        debug_assert!(staged, "ledger_mut yields only open ledgers");
        self.metrics.record_staged();
        debug!(target: "kvdrive::batch", txn_id = %id, key = %key, staged = ledger.len(), "Operation staged");
        Ok(())
    }

    /// Validate and apply batch `id`
    ///
    /// Returns `InvalidBatch` without writing anything if any non-forced
    /// operation's expected version differs from the store's version at
    /// commit start. Either way the batch is resolved and the slot freed.
    pub fn commit(&self, connection: ConnectionId, id: TransactionId) -> Result<CommitOutcome> {
        let mut registry = self.registry.lock();
        let mut ledger = registry
            .take(id, connection)
            .ok_or(Error::BatchNotFound { id })?;

        // Gate stays held until the batch is applied
        let outcome = self.resolve_commit(&mut ledger);

        drop(registry);
        self.slot_released.notify_all();
        outcome
    }

    fn resolve_commit(&self, ledger: &mut BatchLedger) -> Result<CommitOutcome> {
        let id = ledger.id();

        let snapshot = match capture_snapshot(self.store.as_ref(), ledger.operations()) {
            Ok(snapshot) => snapshot,
            Err(e) => return Err(self.fail_commit(ledger, e)),
        };

        let validation = validate_ledger(&snapshot, ledger.operations());
        if let Some(detail) = validation.to_detail(id) {
            ledger.mark_aborted(detail.to_string());
            self.metrics.record_invalid();
            warn!(
                target: "kvdrive::batch",
                txn_id = %id,
                key = %detail.failing_key,
                conflicts = detail.conflict_count,
                "Batch rejected by version check"
            );
            return Ok(CommitOutcome::InvalidBatch(detail));
        }

        let applied = ledger.pending();
        let writes = ledger.to_writes();
        if let Err(e) = self.store.apply_batch(&writes) {
            return Err(self.fail_commit(ledger, e));
        }

        ledger.mark_committed();
        self.metrics.record_commit(writes.len());
        info!(target: "kvdrive::batch", txn_id = %id, operations = writes.len(), "Batch committed");
        Ok(CommitOutcome::Committed(CommitSummary { id, applied }))
    }

    fn fail_commit(&self, ledger: &mut BatchLedger, err: Error) -> Error {
        ledger.mark_aborted(err.to_string());
        self.metrics.record_storage_failure();
        error!(target: "kvdrive::batch", txn_id = %ledger.id(), error = %err, "Commit failed in store");
        err
    }

    /// Discard batch `id` without touching the store
    pub fn abort(&self, connection: ConnectionId, id: TransactionId) -> Result<AbortSummary> {
        let mut ledger = self
            .registry
            .lock()
            .take(id, connection)
            .ok_or(Error::BatchNotFound { id })?;
        self.slot_released.notify_all();

        let discarded = ledger.pending();
        ledger.mark_aborted("aborted by client");
        self.metrics.record_abort();
        debug!(target: "kvdrive::batch", txn_id = %id, discarded = discarded.total(), "Batch aborted");
        Ok(AbortSummary { id, discarded })
    }

    /// Abort whatever batch `connection` owns
    ///
    /// Must be called when a connection closes, so a vanished client
    /// cannot hold the batch slot. Returns the aborted batch id.
    pub fn on_connection_closed(&self, connection: ConnectionId) -> Option<TransactionId> {
        let closed = self.registry.lock().close(connection);
        // Also wakes requests of this connection still waiting for the slot
        self.slot_released.notify_all();
        let mut ledger = closed?;

        let id = ledger.id();
        let discarded = ledger.pending();
        ledger.mark_aborted("connection closed");
        self.metrics.record_disconnect_abort();
        warn!(
            target: "kvdrive::batch",
            connection = %connection,
            txn_id = %id,
            discarded = discarded.total(),
            "Open batch aborted on disconnect"
        );
        Some(id)
    }

    // ========================================================================
    // Single-key Operations
    // ========================================================================

    /// Read the entry stored under `key`
    pub fn get(&self, key: &Key) -> Result<Option<Entry>> {
        self.config.limits.validate_key(key)?;
        self.store.get(key)
    }

    /// Read only the version stored under `key`
    pub fn get_version(&self, key: &Key) -> Result<Option<VersionTag>> {
        self.config.limits.validate_key(key)?;
        self.store.get_version(key)
    }

    /// Conditionally write `entry` outside any batch
    ///
    /// Waits for or fails against a batch owned by another connection, per
    /// the wait policy.
    pub fn put(
        &self,
        connection: ConnectionId,
        entry: Entry,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.config.limits.validate_entry(&entry)?;
        self.config.limits.validate_expected(expected.as_ref())?;

        let key = entry.key.clone();
        let mut registry = self.registry.lock();
        let waited = self.wait_for_slot(&mut registry, connection);
        Self::ensure_live(&registry, connection)?;
        waited.map_err(|reason| self.reject_write(connection, &key, reason))?;
        let outcome = self.store.conditional_put(entry, expected.as_ref(), forced)?;
        drop(registry);

        Self::check_outcome(key, expected, outcome)
    }

    /// Conditionally delete `key` outside any batch
    pub fn delete(
        &self,
        connection: ConnectionId,
        key: &Key,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.config.limits.validate_key(key)?;
        self.config.limits.validate_expected(expected.as_ref())?;

        let mut registry = self.registry.lock();
        let waited = self.wait_for_slot(&mut registry, connection);
        Self::ensure_live(&registry, connection)?;
        waited.map_err(|reason| self.reject_write(connection, key, reason))?;
        let outcome = self.store.conditional_delete(key, expected.as_ref(), forced)?;
        drop(registry);

        Self::check_outcome(key.clone(), expected, outcome)
    }

    fn check_outcome(key: Key, expected: Option<VersionTag>, outcome: WriteOutcome) -> Result<()> {
        match outcome {
            WriteOutcome::Applied => Ok(()),
            WriteOutcome::VersionMismatch { current } => Err(Error::VersionMismatch {
                key,
                expected,
                current,
            }),
        }
    }

    fn reject_write(&self, connection: ConnectionId, key: &Key, reason: ConflictReason) -> Error {
        warn!(
            target: "kvdrive::batch",
            connection = %connection,
            key = %key,
            reason = %reason,
            "Write rejected while batch open"
        );
        Error::Conflict(reason)
    }

    // ========================================================================
    // Slot Waiting
    // ========================================================================

    /// Wait until no other connection holds the batch slot
    ///
    /// Returns with the gate still held. The caller's own slot never
    /// blocks it, and a caller closed while waiting stops waiting; check
    /// `ensure_live` afterwards.
    fn wait_for_slot(
        &self,
        registry: &mut MutexGuard<'_, BatchRegistry>,
        caller: ConnectionId,
    ) -> std::result::Result<(), ConflictReason> {
        let started = Instant::now();
        loop {
            if registry.is_closed(caller) {
                return Ok(());
            }
            let owner = match registry.slot_holder() {
                Some(owner) if owner != caller => owner,
                _ => return Ok(()),
            };

            match self.config.wait_policy {
                WaitPolicy::FailFast => return Err(ConflictReason::BatchInProgress { owner }),
                WaitPolicy::Block { timeout: None } => {
                    self.slot_released.wait(registry);
                }
                WaitPolicy::Block {
                    timeout: Some(timeout),
                } => {
                    let deadline = started + timeout;
                    if Instant::now() >= deadline {
                        return Err(ConflictReason::WaitTimedOut {
                            owner,
                            waited: started.elapsed(),
                        });
                    }
                    self.slot_released.wait_until(registry, deadline);
                }
            }
        }
    }
}

impl<S: ?Sized> BatchTransactionEngine<S> {
    /// Reject requests from a connection already reported closed
    fn ensure_live(registry: &BatchRegistry, connection: ConnectionId) -> Result<()> {
        if registry.is_closed(connection) {
            warn!(target: "kvdrive::batch", connection = %connection, "Request from closed connection");
            return Err(Error::invalid_request(format!(
                "connection {} is closed",
                connection
            )));
        }
        Ok(())
    }
}

impl<S: ?Sized> std::fmt::Debug for BatchTransactionEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchTransactionEngine")
            .field("config", &self.config)
            .field("metrics", &self.metrics.snapshot())
            .finish_non_exhaustive()
    }
}
