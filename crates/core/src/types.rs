//! Core types for kvdrive
//!
//! This module defines the foundational identifiers:
//! - Key: Opaque byte key, compared byte-exactly
//! - VersionTag: Opaque revision marker used for optimistic concurrency
//! - ConnectionId: Identity of a client connection on the drive
//! - TransactionId: Opaque handle for one batch ledger

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Write bytes as text when printable, hex otherwise
fn fmt_bytes(bytes: &[u8], f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if !bytes.is_empty() && bytes.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
        // Printable ASCII is valid UTF-8
        write!(f, "{}", String::from_utf8_lossy(bytes))
    } else {
        write!(f, "0x")?;
        for b in bytes {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

/// Key of a stored entry
///
/// Keys are opaque byte sequences. Equality and ordering are byte-exact,
/// which gives the store a deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key(Vec<u8>);

impl Key {
    /// Create a key from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// Borrow the key bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the key and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    /// Length of the key in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the key has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&[u8]> for Key {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for Key {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bytes(&self.0, f)
    }
}

/// Revision marker of a stored entry
///
/// Two entries are version-matched iff their tags are byte-equal. The
/// "entry does not exist" state is modelled as `Option::<VersionTag>::None`
/// wherever a version is expected or observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VersionTag(Vec<u8>);

impl VersionTag {
    /// Create a version tag from raw bytes
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self(bytes.into())
    }

    /// The zero-length tag
    ///
    /// Stores assign it to entries written without a version, so an
    /// existing entry never reads as absent.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Borrow the tag bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the tag in bytes
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the tag has no bytes
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for VersionTag {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for VersionTag {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl From<&[u8]> for VersionTag {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<Vec<u8>> for VersionTag {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_bytes(&self.0, f)
    }
}

/// Check an expected version against the version currently stored
///
/// `None` on either side means "entry does not exist"; absence matches
/// only absence.
#[inline]
pub fn version_matches(expected: Option<&VersionTag>, current: Option<&VersionTag>) -> bool {
    expected == current
}

/// Identity of a client connection
///
/// Assigned by the connection manager. Batch ledgers are owned by exactly
/// one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Wrap a raw connection number
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Raw connection number
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Handle for one batch ledger
///
/// A TransactionId is a random 128-bit value (UUID v4), so identifiers are
/// unique across the registry's lifetime with negligible collision
/// probability. Callers hold only the id; the registry owns the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Create a new random TransactionId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a TransactionId from raw bytes
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(Uuid::from_bytes(bytes))
    }

    /// Parse a TransactionId from its string form
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Raw bytes of the id
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
