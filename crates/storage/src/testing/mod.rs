//! Testing utilities for stores and the layers built on them
//!
//! - **Fault injection**: A store wrapper that fails reads or batch applies
//!   on demand, for exercising error paths above the store
//! - **Reference model**: Plain map of expected state to compare a store
//!   against after a sequence of batches
//!
//! # Example
//!
//! ```ignore
//! use kvdrive_storage::testing::{FaultInjectingStore, ReferenceModel};
//!
//! let store = FaultInjectingStore::new(InMemoryStore::new());
//! store.fail_next_apply();
//!
//! let mut model = ReferenceModel::from_snapshot(&store.inner().snapshot());
//! model.apply(&writes);
//! assert!(model.compare(&store.inner().snapshot()).is_empty());
//! ```

mod fault_injection;
mod reference_model;

pub use fault_injection::FaultInjectingStore;
pub use reference_model::{ReferenceModel, StateMismatch};
