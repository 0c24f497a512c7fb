//! Storage layer for kvdrive
//!
//! This crate implements the in-memory versioned store with:
//! - InMemoryStore: BTreeMap-based storage with RwLock
//! - Conditional single-key writes (version check and write under one lock)
//! - Atomic multi-key batch application
//! - StoreSnapshot for point-in-time comparison
//! - Test support (reference model, fault injection)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod memory;
pub mod snapshot;
pub mod testing;

pub use memory::InMemoryStore;
pub use snapshot::StoreSnapshot;
