//! Mapping from drive outcomes to protocol status codes
//!
//! The engine reports a [`BatchStatus`]; a transport turns it into the
//! status code and message it puts on the wire through a
//! [`StatusReporter`].

use std::fmt;

use kvdrive_core::BatchStatus;

use crate::command::Output;

/// Status codes of the drive protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    /// Request completed
    Success,
    /// Single-key version check failed
    VersionMismatch,
    /// Key or batch not found
    NotFound,
    /// Batch rejected by a version check; nothing applied
    InvalidBatch,
    /// Request not attempted because the batch slot is taken; retry later
    NotAttempted,
    /// Malformed or disallowed request
    InvalidRequest,
    /// Store or I/O failure
    InternalError,
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Success => "SUCCESS",
            StatusCode::VersionMismatch => "VERSION_MISMATCH",
            StatusCode::NotFound => "NOT_FOUND",
            StatusCode::InvalidBatch => "INVALID_BATCH",
            StatusCode::NotAttempted => "NOT_ATTEMPTED",
            StatusCode::InvalidRequest => "INVALID_REQUEST",
            StatusCode::InternalError => "INTERNAL_ERROR",
        };
        f.write_str(name)
    }
}

/// Status code plus optional human-readable message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    /// Protocol status code
    pub code: StatusCode,
    /// Detail for the client
    pub message: Option<String>,
}

impl StatusReport {
    fn new(code: StatusCode) -> Self {
        Self {
            code,
            message: None,
        }
    }

    fn with_message(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: Some(message.into()),
        }
    }
}

/// Converts drive outcomes into protocol status reports
pub trait StatusReporter: Send + Sync {
    /// Report for a status
    fn report(&self, status: &BatchStatus) -> StatusReport;

    /// Report for a command output
    ///
    /// Reads of absent keys report `NotFound`.
    fn report_output(&self, output: &Output) -> StatusReport {
        match output {
            Output::Entry(None) | Output::Version(None) => {
                StatusReport::with_message(StatusCode::NotFound, "key not found")
            }
            Output::Status(status) => self.report(status),
            Output::Entry(Some(_)) | Output::Version(Some(_)) | Output::BatchStarted(_) => {
                StatusReport::new(StatusCode::Success)
            }
        }
    }
}

/// Status mapping of the drive protocol
#[derive(Debug, Clone, Copy, Default)]
pub struct ProtocolStatusReporter;

impl StatusReporter for ProtocolStatusReporter {
    fn report(&self, status: &BatchStatus) -> StatusReport {
        match status {
            BatchStatus::Accepted
            | BatchStatus::Committed
            | BatchStatus::Aborted
            | BatchStatus::Success => StatusReport::new(StatusCode::Success),
            BatchStatus::InvalidBatch(detail) => {
                StatusReport::with_message(StatusCode::InvalidBatch, detail.to_string())
            }
            BatchStatus::ConflictError(reason) => {
                StatusReport::with_message(StatusCode::NotAttempted, reason.to_string())
            }
            BatchStatus::NotFoundError(id) => {
                StatusReport::with_message(StatusCode::NotFound, format!("batch {} not found", id))
            }
            BatchStatus::VersionMismatch { key, .. } => StatusReport::with_message(
                StatusCode::VersionMismatch,
                format!("version mismatch on key {}", key),
            ),
            BatchStatus::InvalidRequest(msg) => {
                StatusReport::with_message(StatusCode::InvalidRequest, msg.clone())
            }
            BatchStatus::InternalError(msg) => {
                StatusReport::with_message(StatusCode::InternalError, msg.clone())
            }
        }
    }
}
