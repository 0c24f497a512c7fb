//! Request vocabulary accepted by [`crate::Drive::execute`]
//!
//! One `Command` per protocol request. Decoding requests off the wire is
//! the transport's job; this is the already-decoded form.

use kvdrive_core::{BatchStatus, Entry, Key, TransactionId, VersionTag};

/// A decoded client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read an entry
    Get {
        /// Key to read
        key: Key,
    },
    /// Read only an entry's version
    GetVersion {
        /// Key to read
        key: Key,
    },
    /// Conditional single-key write
    Put {
        /// Entry to store
        entry: Entry,
        /// Version the key must currently have
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
    /// Conditional single-key delete
    Delete {
        /// Key to remove
        key: Key,
        /// Version the key must currently have
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
    /// Open a batch
    BeginBatch,
    /// Stage a put into a batch
    BatchPut {
        /// Target batch
        id: TransactionId,
        /// Entry to store on commit
        entry: Entry,
        /// Version the key must have at commit
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
    /// Stage a delete into a batch
    BatchDelete {
        /// Target batch
        id: TransactionId,
        /// Key to remove on commit
        key: Key,
        /// Version the key must have at commit
        expected: Option<VersionTag>,
        /// Skip the version check
        forced: bool,
    },
    /// Validate and apply a batch
    CommitBatch {
        /// Target batch
        id: TransactionId,
    },
    /// Discard a batch
    AbortBatch {
        /// Target batch
        id: TransactionId,
    },
}

impl Command {
    /// Short name for logging
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::GetVersion { .. } => "get_version",
            Command::Put { .. } => "put",
            Command::Delete { .. } => "delete",
            Command::BeginBatch => "begin_batch",
            Command::BatchPut { .. } => "batch_put",
            Command::BatchDelete { .. } => "batch_delete",
            Command::CommitBatch { .. } => "commit_batch",
            Command::AbortBatch { .. } => "abort_batch",
        }
    }

    /// True for commands that belong to a batch
    pub fn is_batch(&self) -> bool {
        matches!(
            self,
            Command::BeginBatch
                | Command::BatchPut { .. }
                | Command::BatchDelete { .. }
                | Command::CommitBatch { .. }
                | Command::AbortBatch { .. }
        )
    }
}

/// Result of executing a [`Command`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Entry read by `Get`; `None` if absent
    Entry(Option<Entry>),
    /// Version read by `GetVersion`; `None` if absent
    Version(Option<VersionTag>),
    /// Batch opened by `BeginBatch`
    BatchStarted(TransactionId),
    /// Outcome of every other command, and of any failure
    Status(BatchStatus),
}

impl Output {
    /// The status this output carries
    pub fn status(&self) -> BatchStatus {
        match self {
            Output::Status(status) => status.clone(),
            Output::Entry(_) | Output::Version(_) | Output::BatchStarted(_) => BatchStatus::Success,
        }
    }

    /// True unless the command failed
    pub fn is_success(&self) -> bool {
        match self {
            Output::Status(status) => status.is_success(),
            _ => true,
        }
    }

    /// Batch id, if this is the output of `BeginBatch`
    pub fn batch_id(&self) -> Option<TransactionId> {
        match self {
            Output::BatchStarted(id) => Some(*id),
            _ => None,
        }
    }
}
