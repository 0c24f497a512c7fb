//! Store wrapper that fails on demand
//!
//! Wraps any [`VersionedStore`] and turns selected calls into
//! `Error::Storage` before they reach the inner store, so the inner store
//! is never partially mutated by an injected fault.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use kvdrive_core::{
    BatchWrite, Entry, Error, Key, Result, VersionTag, VersionedStore, WriteOutcome,
};

/// VersionedStore wrapper with switchable failures
#[derive(Debug, Default)]
pub struct FaultInjectingStore<S> {
    inner: S,
    fail_next_apply: AtomicBool,
    fail_reads: AtomicBool,
    injected: AtomicU64,
}

impl<S: VersionedStore> FaultInjectingStore<S> {
    /// Wrap `inner` with no faults armed
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            fail_next_apply: AtomicBool::new(false),
            fail_reads: AtomicBool::new(false),
            injected: AtomicU64::new(0),
        }
    }

    /// The wrapped store
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Fail the next `apply_batch` call
    pub fn fail_next_apply(&self) {
        self.fail_next_apply.store(true, Ordering::SeqCst);
    }

    /// Fail every read until cleared
    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of faults injected so far
    pub fn injected_faults(&self) -> u64 {
        self.injected.load(Ordering::SeqCst)
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            self.injected.fetch_add(1, Ordering::SeqCst);
            return Err(Error::storage("injected read failure"));
        }
        Ok(())
    }
}

impl<S: VersionedStore> VersionedStore for FaultInjectingStore<S> {
    fn get(&self, key: &Key) -> Result<Option<Entry>> {
        self.check_read()?;
        self.inner.get(key)
    }

    fn get_version(&self, key: &Key) -> Result<Option<VersionTag>> {
        self.check_read()?;
        self.inner.get_version(key)
    }

    fn conditional_put(
        &self,
        entry: Entry,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome> {
        self.inner.conditional_put(entry, expected, forced)
    }

    fn conditional_delete(
        &self,
        key: &Key,
        expected: Option<&VersionTag>,
        forced: bool,
    ) -> Result<WriteOutcome> {
        self.inner.conditional_delete(key, expected, forced)
    }

    fn apply_batch(&self, writes: &[BatchWrite]) -> Result<()> {
        if self.fail_next_apply.swap(false, Ordering::SeqCst) {
            self.injected.fetch_add(1, Ordering::SeqCst);
            return Err(Error::storage("injected apply failure"));
        }
        self.inner.apply_batch(writes)
    }
}
