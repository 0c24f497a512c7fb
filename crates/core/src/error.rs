//! Error types for kvdrive
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A failed version check inside a batch is NOT an error: commit reports it
//! as an invalid-batch outcome so callers can tell it apart from
//! connectivity or storage faults.

use std::fmt;
use std::io;
use std::time::Duration;
use thiserror::Error;

use crate::limits::LimitError;
use crate::types::{ConnectionId, Key, TransactionId, VersionTag};

/// Result type alias for kvdrive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Why a request could not take the batch slot or write gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// The calling connection already owns an open batch
    ConnectionOwnsBatch {
        /// Calling connection
        connection: ConnectionId,
        /// The batch it already owns
        id: TransactionId,
    },
    /// Another connection holds the device-wide batch slot
    BatchInProgress {
        /// Connection owning the open batch
        owner: ConnectionId,
    },
    /// Waited for the batch slot and gave up
    WaitTimedOut {
        /// Connection owning the open batch
        owner: ConnectionId,
        /// How long the caller waited
        waited: Duration,
    },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::ConnectionOwnsBatch { connection, id } => {
                write!(f, "{} already owns open batch {}", connection, id)
            }
            ConflictReason::BatchInProgress { owner } => {
                write!(f, "batch in progress on {}", owner)
            }
            ConflictReason::WaitTimedOut { owner, waited } => {
                write!(f, "timed out after {:?} waiting for batch on {}", waited, owner)
            }
        }
    }
}

/// Error types for the drive
#[derive(Debug, Error)]
pub enum Error {
    /// The batch slot or write gate is taken; retry later
    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    /// Batch does not exist, is resolved, or belongs to another connection
    #[error("Batch not found: {id}")]
    BatchNotFound {
        /// Requested batch
        id: TransactionId,
    },

    /// Single-key write rejected by its version check
    #[error("Version mismatch on key {key}: expected {}, current {}", fmt_version(.expected), fmt_version(.current))]
    VersionMismatch {
        /// Key of the write
        key: Key,
        /// Version the caller expected
        expected: Option<VersionTag>,
        /// Version currently stored
        current: Option<VersionTag>,
    },

    /// Size limit violated
    #[error("Limit exceeded: {0}")]
    Limit(#[from] LimitError),

    /// Malformed or disallowed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Storage layer failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),
}

fn fmt_version(version: &Option<VersionTag>) -> String {
    match version {
        Some(v) => v.to_string(),
        None => "<absent>".to_string(),
    }
}

impl Error {
    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Error::Storage(message.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    /// True for batch-slot conflicts
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    /// True if the referenced batch does not exist for the caller
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BatchNotFound { .. })
    }

    /// True if retrying the same request later may succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Conflict(ConflictReason::BatchInProgress { .. }))
            || matches!(self, Error::Conflict(ConflictReason::WaitTimedOut { .. }))
    }
}
