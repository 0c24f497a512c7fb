//! Core types and traits for kvdrive
//!
//! This crate defines the foundational types used throughout the system:
//! - Key, VersionTag: Opaque byte identifiers compared byte-exactly
//! - ConnectionId, TransactionId: Ownership and batch handles
//! - Entry, EntryMetadata: What the drive stores per key
//! - Error: Error type hierarchy
//! - Limits: Size limits for keys, values and metadata
//! - Traits: The VersionedStore abstraction
//! - BatchStatus: Outcome vocabulary returned to callers

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod limits;
pub mod status;
pub mod traits;
pub mod types;

// Re-export commonly used types and traits
pub use entry::{Entry, EntryMetadata, IntegrityAlgorithm};
pub use error::{ConflictReason, Error, Result};
pub use limits::{LimitError, Limits};
pub use status::{BatchStatus, InvalidBatchDetail};
pub use traits::{BatchWrite, VersionedStore, WriteOutcome};
pub use types::{version_matches, ConnectionId, Key, TransactionId, VersionTag};
