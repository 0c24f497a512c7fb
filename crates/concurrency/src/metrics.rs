//! Batch lifecycle counters
//!
//! # Memory Ordering
//!
//! All counters use Relaxed ordering. They are observational only and do
//! not synchronize any other memory operations.

use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for the batch engine
#[derive(Debug, Default)]
pub struct BatchMetrics {
    begun: AtomicU64,
    committed: AtomicU64,
    invalid: AtomicU64,
    aborted: AtomicU64,
    aborted_on_disconnect: AtomicU64,
    storage_failures: AtomicU64,
    operations_staged: AtomicU64,
    operations_applied: AtomicU64,
}

/// Point-in-time copy of [`BatchMetrics`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Batches opened
    pub begun: u64,
    /// Batches applied
    pub committed: u64,
    /// Batches rejected by a version check
    pub invalid: u64,
    /// Batches aborted by their owner
    pub aborted: u64,
    /// Batches aborted because their connection closed
    pub aborted_on_disconnect: u64,
    /// Commits that failed in the store
    pub storage_failures: u64,
    /// Operations accepted into ledgers
    pub operations_staged: u64,
    /// Operations written to the store by commits
    pub operations_applied: u64,
}

impl MetricsSnapshot {
    /// Batches resolved by any path
    pub fn resolved(&self) -> u64 {
        self.committed
            + self.invalid
            + self.aborted
            + self.aborted_on_disconnect
            + self.storage_failures
    }

    /// Batches still open
    pub fn open(&self) -> u64 {
        self.begun.saturating_sub(self.resolved())
    }
}

impl BatchMetrics {
    /// Create zeroed counters
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_begin(&self) {
        self.begun.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_staged(&self) {
        self.operations_staged.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, operations: usize) {
        self.committed.fetch_add(1, Ordering::Relaxed);
        self.operations_applied
            .fetch_add(operations as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_invalid(&self) {
        self.invalid.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_abort(&self) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disconnect_abort(&self) {
        self.aborted_on_disconnect.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_storage_failure(&self) {
        self.storage_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            invalid: self.invalid.load(Ordering::Relaxed),
            aborted: self.aborted.load(Ordering::Relaxed),
            aborted_on_disconnect: self.aborted_on_disconnect.load(Ordering::Relaxed),
            storage_failures: self.storage_failures.load(Ordering::Relaxed),
            operations_staged: self.operations_staged.load(Ordering::Relaxed),
            operations_applied: self.operations_applied.load(Ordering::Relaxed),
        }
    }
}
