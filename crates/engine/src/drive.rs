//! Drive: the request-facing facade
//!
//! A `Drive` owns the batch engine and the set of live connections. Every
//! request names the connection it arrived on; requests from connections
//! that were never opened, or were already closed, are rejected.
//!
//! # Example
//!
//! ```ignore
//! let drive = Drive::in_memory(&DriveConfig::default())?;
//! let conn = drive.connect();
//!
//! let id = drive.begin_batch(conn)?;
//! drive.batch_put(conn, id, Entry::versioned("foo", "foovalue", "1234"), None, true)?;
//! drive.commit_batch(conn, id)?;
//!
//! drive.disconnect(conn);
//! ```

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use tracing::{debug, info};

use kvdrive_concurrency::{
    AbortSummary, BatchConfig, BatchInfo, BatchTransactionEngine, CommitOutcome, MetricsSnapshot,
};
use kvdrive_core::{
    BatchStatus, ConnectionId, Entry, Error, Key, Result, TransactionId, VersionTag,
    VersionedStore,
};
use kvdrive_storage::InMemoryStore;

use crate::command::{Command, Output};
use crate::config::{DriveConfig, CONFIG_FILE_NAME};

/// A key-value drive serving many connections
pub struct Drive<S: ?Sized = InMemoryStore> {
    connections: Mutex<FxHashSet<ConnectionId>>,
    next_connection: AtomicU64,
    engine: BatchTransactionEngine<S>,
}

impl Drive<InMemoryStore> {
    /// Create a drive over an empty in-memory store
    pub fn in_memory(config: &DriveConfig) -> Result<Self> {
        Self::new(Arc::new(InMemoryStore::new()), config)
    }

    /// Open a drive configured from `dir/kvdrive.toml`
    ///
    /// Writes the default config file first if none exists.
    pub fn open(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        DriveConfig::write_default_if_missing(&path)?;
        let config = DriveConfig::from_file(&path)?;
        Self::in_memory(&config)
    }
}

impl<S: VersionedStore + ?Sized> Drive<S> {
    /// Create a drive over `store`
    pub fn new(store: Arc<S>, config: &DriveConfig) -> Result<Self> {
        Ok(Self::with_batch_config(store, config.batch_config()?))
    }

    /// Create a drive from an already-built engine configuration
    pub fn with_batch_config(store: Arc<S>, config: BatchConfig) -> Self {
        info!(
            target: "kvdrive::drive",
            wait_policy = ?config.wait_policy,
            max_operations = config.max_operations_per_batch,
            "Drive started"
        );
        Self {
            connections: Mutex::new(FxHashSet::default()),
            next_connection: AtomicU64::new(1),
            engine: BatchTransactionEngine::new(store, config),
        }
    }

    /// The batch engine
    pub fn engine(&self) -> &BatchTransactionEngine<S> {
        &self.engine
    }

    /// The underlying store
    pub fn store(&self) -> &Arc<S> {
        self.engine.store()
    }

    /// Summary of the open batch, if any
    pub fn active_batch(&self) -> Option<BatchInfo> {
        self.engine.active_batch()
    }

    /// Batch engine counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.engine.metrics()
    }

    // ========================================================================
    // Connections
    // ========================================================================

    /// Register a new connection
    pub fn connect(&self) -> ConnectionId {
        let id = ConnectionId::new(self.next_connection.fetch_add(1, Ordering::Relaxed));
        self.connections.lock().insert(id);
        debug!(target: "kvdrive::drive", connection = %id, "Connection opened");
        id
    }

    /// Close a connection, aborting any batch it left open
    ///
    /// Returns the id of the aborted batch.
    pub fn disconnect(&self, connection: ConnectionId) -> Option<TransactionId> {
        let known = self.connections.lock().remove(&connection);
        let aborted = self.engine.on_connection_closed(connection);
        if known {
            debug!(target: "kvdrive::drive", connection = %connection, "Connection closed");
        }
        aborted
    }

    /// True if `connection` is open
    pub fn is_connected(&self, connection: ConnectionId) -> bool {
        self.connections.lock().contains(&connection)
    }

    /// Number of open connections
    pub fn connection_count(&self) -> usize {
        self.connections.lock().len()
    }

    fn check_connection(&self, connection: ConnectionId) -> Result<()> {
        if self.is_connected(connection) {
            Ok(())
        } else {
            Err(Error::invalid_request(format!(
                "unknown connection {}",
                connection
            )))
        }
    }

    // ========================================================================
    // Single-key Operations
    // ========================================================================

    /// Read the entry under `key`
    pub fn get(&self, connection: ConnectionId, key: &Key) -> Result<Option<Entry>> {
        self.check_connection(connection)?;
        self.engine.get(key)
    }

    /// Read the version under `key`
    pub fn get_version(&self, connection: ConnectionId, key: &Key) -> Result<Option<VersionTag>> {
        self.check_connection(connection)?;
        self.engine.get_version(key)
    }

    /// Conditionally write `entry`
    pub fn put(
        &self,
        connection: ConnectionId,
        entry: Entry,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.check_connection(connection)?;
        self.engine.put(connection, entry, expected, forced)
    }

    /// Conditionally delete `key`
    pub fn delete(
        &self,
        connection: ConnectionId,
        key: &Key,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.check_connection(connection)?;
        self.engine.delete(connection, key, expected, forced)
    }

    // ========================================================================
    // Batch Operations
    // ========================================================================

    /// Open a batch on `connection`
    pub fn begin_batch(&self, connection: ConnectionId) -> Result<TransactionId> {
        self.check_connection(connection)?;
        self.engine.begin(connection)
    }

    /// Stage a put into batch `id`
    pub fn batch_put(
        &self,
        connection: ConnectionId,
        id: TransactionId,
        entry: Entry,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.check_connection(connection)?;
        self.engine.stage_put(connection, id, entry, expected, forced)
    }

    /// Stage a delete into batch `id`
    pub fn batch_delete(
        &self,
        connection: ConnectionId,
        id: TransactionId,
        key: Key,
        expected: Option<VersionTag>,
        forced: bool,
    ) -> Result<()> {
        self.check_connection(connection)?;
        self.engine.stage_delete(connection, id, key, expected, forced)
    }

    /// Validate and apply batch `id`
    pub fn commit_batch(&self, connection: ConnectionId, id: TransactionId) -> Result<CommitOutcome> {
        self.check_connection(connection)?;
        self.engine.commit(connection, id)
    }

    /// Discard batch `id`
    pub fn abort_batch(&self, connection: ConnectionId, id: TransactionId) -> Result<AbortSummary> {
        self.check_connection(connection)?;
        self.engine.abort(connection, id)
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Execute a decoded request
    ///
    /// Never fails: errors come back as `Output::Status`.
    pub fn execute(&self, connection: ConnectionId, command: Command) -> Output {
        let name = command.name();
        let result = self.dispatch(connection, command);
        match result {
            Ok(output) => output,
            Err(err) => {
                debug!(
                    target: "kvdrive::drive",
                    connection = %connection,
                    command = name,
                    error = %err,
                    "Command failed"
                );
                Output::Status(BatchStatus::from(err))
            }
        }
    }

    fn dispatch(&self, connection: ConnectionId, command: Command) -> Result<Output> {
        let output = match command {
            Command::Get { key } => Output::Entry(self.get(connection, &key)?),
            Command::GetVersion { key } => Output::Version(self.get_version(connection, &key)?),
            Command::Put {
                entry,
                expected,
                forced,
            } => {
                self.put(connection, entry, expected, forced)?;
                Output::Status(BatchStatus::Success)
            }
            Command::Delete {
                key,
                expected,
                forced,
            } => {
                self.delete(connection, &key, expected, forced)?;
                Output::Status(BatchStatus::Success)
            }
            Command::BeginBatch => Output::BatchStarted(self.begin_batch(connection)?),
            Command::BatchPut {
                id,
                entry,
                expected,
                forced,
            } => {
                self.batch_put(connection, id, entry, expected, forced)?;
                Output::Status(BatchStatus::Accepted)
            }
            Command::BatchDelete {
                id,
                key,
                expected,
                forced,
            } => {
                self.batch_delete(connection, id, key, expected, forced)?;
                Output::Status(BatchStatus::Accepted)
            }
            Command::CommitBatch { id } => {
                Output::Status(BatchStatus::from(self.commit_batch(connection, id)?))
            }
            Command::AbortBatch { id } => {
                self.abort_batch(connection, id)?;
                Output::Status(BatchStatus::Aborted)
            }
        };
        Ok(output)
    }
}

impl<S: ?Sized> std::fmt::Debug for Drive<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Drive")
            .field("connections", &self.connections.lock().len())
            .field("engine", &self.engine)
            .finish()
    }
}
