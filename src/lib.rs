//! kvdrive - key-value drive with atomic, version-checked batch operations
//!
//! Clients talk to a [`Drive`] over connections. Single-key requests read
//! and conditionally write entries; batch requests stage puts and deletes
//! under one transaction id and apply them all at once on commit, or none
//! of them if any version check fails.
//!
//! # Quick Start
//!
//! ```ignore
//! use kvdrive::{Drive, DriveConfig, Entry, Key};
//!
//! let drive = Drive::in_memory(&DriveConfig::default())?;
//! let conn = drive.connect();
//!
//! let id = drive.begin_batch(conn)?;
//! drive.batch_put(conn, id, Entry::versioned("foo", "foovalue", "1234"), None, true)?;
//! drive.batch_put(conn, id, Entry::versioned("bar", "barvalue", "1234"), None, true)?;
//! assert!(drive.commit_batch(conn, id)?.is_committed());
//!
//! let foo = drive.get(conn, &Key::from("foo"))?;
//! ```
//!
//! # Architecture
//!
//! All requests go through the [`Drive`], either as direct method calls or
//! as decoded [`Command`]s passed to [`Drive::execute`]. Storage and batch
//! internals live in the workspace crates and are re-exported here only
//! where they appear in the drive API.

// Re-export the public API from kvdrive-engine
pub use kvdrive_engine::*;

pub use kvdrive_concurrency::{
    AbortSummary, BatchConfig, BatchInfo, CommitOutcome, CommitSummary, MetricsSnapshot,
    PendingOperations, WaitPolicy,
};
pub use kvdrive_core::{
    BatchStatus, ConflictReason, ConnectionId, Entry, EntryMetadata, Error, IntegrityAlgorithm,
    InvalidBatchDetail, Key, LimitError, Limits, Result, TransactionId, VersionTag,
    VersionedStore,
};
pub use kvdrive_storage::{InMemoryStore, StoreSnapshot};
