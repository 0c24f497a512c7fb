//! Concurrency layer for kvdrive
//!
//! This crate implements the batch transaction engine with:
//! - BatchLedger: ordered staged operations per transaction
//! - Pure commit-time validation against a version snapshot
//! - BatchRegistry: ledger ownership and the device-wide batch slot
//! - BatchTransactionEngine: begin/stage/commit/abort and the write gate
//! - Lifecycle metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod engine;
pub mod ledger;
pub mod metrics;
pub mod registry;
pub mod validation;

pub use config::{BatchConfig, WaitPolicy, DEFAULT_MAX_OPERATIONS_PER_BATCH};
pub use engine::{AbortSummary, BatchTransactionEngine, CommitOutcome, CommitSummary};
pub use ledger::{BatchLedger, LedgerState, PendingOperations, StagedOperation};
pub use metrics::{BatchMetrics, MetricsSnapshot};
pub use registry::{BatchInfo, BatchRegistry};
pub use validation::{
    capture_snapshot, validate_ledger, ValidationResult, VersionConflict, VersionSnapshot,
};
