//! Stored entries and their metadata
//!
//! An [`Entry`] is what the drive persists for one key: the value bytes
//! plus [`EntryMetadata`]. The version in the metadata is the entry's
//! current [`VersionTag`]. Integrity fields (`tag`, `algorithm`) are
//! supplied by clients and stored opaquely; the drive never verifies them.

use serde::{Deserialize, Serialize};

use crate::types::{Key, VersionTag};

/// Algorithm a client used to compute an entry's integrity tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegrityAlgorithm {
    /// SHA-1
    Sha1,
    /// SHA-2
    Sha2,
    /// SHA-3
    Sha3,
    /// CRC-32
    Crc32,
    /// CRC-64
    Crc64,
}

/// Metadata attached to a stored entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryMetadata {
    /// Current revision of the entry
    pub version: Option<VersionTag>,
    /// Client-supplied integrity tag
    pub tag: Option<Vec<u8>>,
    /// Algorithm used to compute `tag`
    pub algorithm: Option<IntegrityAlgorithm>,
}

impl EntryMetadata {
    /// Metadata carrying only a version
    pub fn with_version(version: impl Into<VersionTag>) -> Self {
        Self {
            version: Some(version.into()),
            ..Self::default()
        }
    }
}

/// A key, its value and its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry key
    pub key: Key,
    /// Entry value
    pub value: Vec<u8>,
    /// Version and integrity metadata
    pub metadata: EntryMetadata,
}

impl Entry {
    /// Create an entry without a version
    pub fn new(key: impl Into<Key>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata: EntryMetadata::default(),
        }
    }

    /// Create an entry carrying `version`
    pub fn versioned(
        key: impl Into<Key>,
        value: impl Into<Vec<u8>>,
        version: impl Into<VersionTag>,
    ) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata: EntryMetadata::with_version(version),
        }
    }

    /// Replace the version, keeping the rest of the metadata
    pub fn with_version(mut self, version: Option<VersionTag>) -> Self {
        self.metadata.version = version;
        self
    }

    /// Attach an integrity tag
    pub fn with_tag(mut self, tag: impl Into<Vec<u8>>, algorithm: IntegrityAlgorithm) -> Self {
        self.metadata.tag = Some(tag.into());
        self.metadata.algorithm = Some(algorithm);
        self
    }

    /// Current version of the entry
    #[inline]
    pub fn version(&self) -> Option<&VersionTag> {
        self.metadata.version.as_ref()
    }
}
