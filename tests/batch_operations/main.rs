//! Batch Operation Integration Tests
//!
//! Drive-level tests for atomic batches: staging, commit, abort, isolation
//! between connections and multi-client contention.

#[path = "../common/mod.rs"]
mod common;

mod abort;
mod config;
mod deletes;
mod isolation;
mod mixed;
mod multi_client;
mod puts;
