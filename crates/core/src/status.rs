//! Outcome vocabulary returned to callers
//!
//! Every request handled by the drive resolves to one [`BatchStatus`]. The
//! transport layer maps these onto protocol status codes; see the engine
//! crate's status reporter.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ConflictReason, Error};
use crate::types::{Key, TransactionId, VersionTag};

/// Why a batch commit was rejected
///
/// Carries the first failing operation in ledger order plus the total
/// number of failing operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidBatchDetail {
    /// Rejected batch
    pub id: TransactionId,
    /// Key of the first failing operation
    pub failing_key: Key,
    /// Position of the first failing operation in the ledger
    pub failing_index: usize,
    /// Version the first failing operation expected
    pub expected: Option<VersionTag>,
    /// Version stored when the batch was validated
    pub current: Option<VersionTag>,
    /// Number of failing operations in the batch
    pub conflict_count: usize,
}

impl fmt::Display for InvalidBatchDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "batch {} rejected: operation {} on key {} failed its version check ({} failing)",
            self.id, self.failing_index, self.failing_key, self.conflict_count
        )
    }
}

/// Result of a request as seen by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// Operation staged into a batch; not applied yet
    Accepted,
    /// Batch applied atomically
    Committed,
    /// Batch discarded without touching the store
    Aborted,
    /// Batch discarded because a version check failed
    InvalidBatch(InvalidBatchDetail),
    /// Batch slot unavailable; retry later
    ConflictError(ConflictReason),
    /// Batch missing, resolved, or owned by another connection
    NotFoundError(TransactionId),
    /// Single-key request completed
    Success,
    /// Single-key write rejected by its version check
    VersionMismatch {
        /// Key of the write
        key: Key,
        /// Version stored at the time of the check
        current: Option<VersionTag>,
    },
    /// Request rejected before reaching the store
    InvalidRequest(String),
    /// Storage or I/O failure
    InternalError(String),
}

impl BatchStatus {
    /// True for outcomes that completed what the caller asked for
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            BatchStatus::Accepted
                | BatchStatus::Committed
                | BatchStatus::Aborted
                | BatchStatus::Success
        )
    }
}

impl From<&Error> for BatchStatus {
    fn from(err: &Error) -> Self {
        match err {
            Error::Conflict(reason) => BatchStatus::ConflictError(reason.clone()),
            Error::BatchNotFound { id } => BatchStatus::NotFoundError(*id),
            Error::VersionMismatch { key, current, .. } => BatchStatus::VersionMismatch {
                key: key.clone(),
                current: current.clone(),
            },
            Error::Limit(e) => BatchStatus::InvalidRequest(e.to_string()),
            Error::InvalidRequest(msg) => BatchStatus::InvalidRequest(msg.clone()),
            Error::Storage(_) | Error::Io(_) | Error::Config(_) => {
                BatchStatus::InternalError(err.to_string())
            }
        }
    }
}

impl From<Error> for BatchStatus {
    fn from(err: Error) -> Self {
        BatchStatus::from(&err)
    }
}
