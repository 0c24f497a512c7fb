//! Shared test utilities for the integration test suites.
//!
//! Import via `#[path = "../common/mod.rs"] mod common;` from a suite's main.rs.

#![allow(dead_code)]
#![allow(unused_imports)]

use std::sync::{Arc, Once};

pub use kvdrive::{
    BatchStatus, CommitOutcome, ConnectionId, Drive, DriveConfig, Entry, Error, Key,
    StoreSnapshot, TransactionId, VersionTag,
};

// ============================================================================
// Initialization
// ============================================================================

static INIT_TRACING: Once = Once::new();

/// Install a test-writer subscriber once per test binary.
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

// ============================================================================
// Test Drive
// ============================================================================

/// A drive plus one open connection for the common single-client case.
pub struct TestDrive {
    pub drive: Arc<Drive>,
    pub conn: ConnectionId,
}

impl TestDrive {
    /// Empty drive with default configuration.
    pub fn new() -> Self {
        Self::with_config(DriveConfig::default())
    }

    /// Empty drive with `config`.
    pub fn with_config(config: DriveConfig) -> Self {
        init_tracing();
        let drive = Arc::new(Drive::in_memory(&config).expect("valid config"));
        let conn = drive.connect();
        Self { drive, conn }
    }

    /// Drive whose waits block instead of failing fast.
    pub fn blocking() -> Self {
        Self::with_config(DriveConfig {
            begin_policy: "block".to_string(),
            ..DriveConfig::default()
        })
    }

    /// Seed `entries` with forced single-key puts.
    pub fn seeded(entries: &[(&str, &str, &str)]) -> Self {
        let test = Self::new();
        for (key, value, version) in entries {
            test.drive
                .put(test.conn, Entry::versioned(*key, *value, *version), None, true)
                .expect("seed put");
        }
        test
    }

    /// Open another connection on the same drive.
    pub fn connect(&self) -> ConnectionId {
        self.drive.connect()
    }

    /// Begin a batch on the primary connection.
    pub fn begin(&self) -> TransactionId {
        self.drive.begin_batch(self.conn).expect("begin")
    }

    /// Stage a put on the primary connection.
    pub fn stage_put(&self, id: TransactionId, key: &str, value: &str, version: &str, expected: Option<&str>, forced: bool) {
        self.drive
            .batch_put(
                self.conn,
                id,
                Entry::versioned(key, value, version),
                expected.map(VersionTag::from),
                forced,
            )
            .expect("stage put");
    }

    /// Stage a delete on the primary connection.
    pub fn stage_delete(&self, id: TransactionId, key: &str, expected: Option<&str>, forced: bool) {
        self.drive
            .batch_delete(self.conn, id, Key::from(key), expected.map(VersionTag::from), forced)
            .expect("stage delete");
    }

    /// Commit on the primary connection.
    pub fn commit(&self, id: TransactionId) -> CommitOutcome {
        self.drive.commit_batch(self.conn, id).expect("commit")
    }

    /// Point-in-time copy of the whole store.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.drive.store().snapshot()
    }

    /// Entry under `key`, read on the primary connection.
    pub fn get(&self, key: &str) -> Option<Entry> {
        self.drive.get(self.conn, &Key::from(key)).expect("get")
    }

    /// Version under `key`.
    pub fn version(&self, key: &str) -> Option<VersionTag> {
        self.drive
            .get_version(self.conn, &Key::from(key))
            .expect("get_version")
    }
}

// ============================================================================
// Assertions
// ============================================================================

/// Assert `key` holds `value` at `version`.
pub fn assert_entry(entry: Option<Entry>, value: &str, version: &str) {
    let entry = entry.expect("entry should exist");
    assert_eq!(entry.value, value.as_bytes().to_vec());
    assert_eq!(entry.version(), Some(&VersionTag::from(version)));
}

/// Assert a commit was rejected on `key`.
pub fn assert_invalid_on(outcome: &CommitOutcome, key: &str) {
    match outcome {
        CommitOutcome::InvalidBatch(detail) => assert_eq!(detail.failing_key, Key::from(key)),
        other => panic!("expected invalid batch on {}, got {:?}", key, other),
    }
}
