//! Size limits for keys, values and metadata
//!
//! This module defines the limits enforced when an operation is staged into
//! a batch or submitted as a single-key write. Violations result in
//! `LimitError`s and never reach the store.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entry::Entry;
use crate::types::{Key, VersionTag};

/// Size limits for keys, values, versions and integrity tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum key length in bytes (default: 4096)
    pub max_key_size: usize,

    /// Maximum value length in bytes (default: 1MB)
    pub max_value_size: usize,

    /// Maximum version tag length in bytes (default: 2048)
    pub max_version_size: usize,

    /// Maximum integrity tag length in bytes (default: 128)
    pub max_tag_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_key_size: 4096,
            max_value_size: 1024 * 1024, // 1MB
            max_version_size: 2048,
            max_tag_size: 128,
        }
    }
}

impl Limits {
    /// Create limits with small values for testing
    pub fn with_small_limits() -> Self {
        Limits {
            max_key_size: 16,
            max_value_size: 64,
            max_version_size: 8,
            max_tag_size: 8,
        }
    }

    /// Validate a key
    ///
    /// Keys must be non-empty and no longer than `max_key_size`.
    pub fn validate_key(&self, key: &Key) -> Result<(), LimitError> {
        if key.is_empty() {
            return Err(LimitError::EmptyKey);
        }
        if key.len() > self.max_key_size {
            return Err(LimitError::KeyTooLong {
                actual: key.len(),
                max: self.max_key_size,
            });
        }
        Ok(())
    }

    /// Validate a version tag (new or expected)
    pub fn validate_version(&self, version: &VersionTag) -> Result<(), LimitError> {
        if version.len() > self.max_version_size {
            return Err(LimitError::VersionTooLong {
                actual: version.len(),
                max: self.max_version_size,
            });
        }
        Ok(())
    }

    /// Validate an entry: key, value, version and integrity tag
    pub fn validate_entry(&self, entry: &Entry) -> Result<(), LimitError> {
        self.validate_key(&entry.key)?;
        if entry.value.len() > self.max_value_size {
            return Err(LimitError::ValueTooLarge {
                actual: entry.value.len(),
                max: self.max_value_size,
            });
        }
        if let Some(version) = entry.version() {
            self.validate_version(version)?;
        }
        if let Some(tag) = &entry.metadata.tag {
            if tag.len() > self.max_tag_size {
                return Err(LimitError::TagTooLong {
                    actual: tag.len(),
                    max: self.max_tag_size,
                });
            }
        }
        Ok(())
    }

    /// Validate an optional expected version
    pub fn validate_expected(&self, expected: Option<&VersionTag>) -> Result<(), LimitError> {
        match expected {
            Some(version) => self.validate_version(version),
            None => Ok(()),
        }
    }
}

/// Limit violation errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LimitError {
    /// Key has no bytes
    #[error("key must not be empty")]
    EmptyKey,

    /// Key exceeds maximum length
    #[error("key too long: {actual} bytes (max: {max})")]
    KeyTooLong {
        /// Actual key length
        actual: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Value exceeds maximum size
    #[error("value too large: {actual} bytes (max: {max})")]
    ValueTooLarge {
        /// Actual value size
        actual: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Version tag exceeds maximum length
    #[error("version too long: {actual} bytes (max: {max})")]
    VersionTooLong {
        /// Actual version length
        actual: usize,
        /// Maximum allowed
        max: usize,
    },

    /// Integrity tag exceeds maximum length
    #[error("tag too long: {actual} bytes (max: {max})")]
    TagTooLong {
        /// Actual tag length
        actual: usize,
        /// Maximum allowed
        max: usize,
    },
}
