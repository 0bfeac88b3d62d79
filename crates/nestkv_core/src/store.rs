//! Store facade.

use crate::config::Config;
use crate::error::{StoreError, StoreResult};
use crate::transaction::TransactionManager;
use crate::types::TransactionId;
use nestkv_storage::{FileBackend, FileBackendOptions, InMemoryBackend, StorageBackend};
use nestkv_value::Value;
use std::collections::HashMap;
use std::path::Path;

/// A transactional key-value store.
///
/// The facade over the [`TransactionManager`]: every public operation
/// checks the "active transaction" precondition first and fails fast
/// with [`StoreError::NoActiveTransaction`], so internal guards below
/// it are unreachable in correct usage.
///
/// A `Store` models exactly one logical session; it performs no
/// internal locking. Sharing one instance across independent callers
/// without external coordination is undefined - use
/// [`crate::SharedStore`] for that.
///
/// # Example
///
/// ```
/// use nestkv_core::Store;
/// use nestkv_value::Value;
///
/// let mut store = Store::in_memory().unwrap();
///
/// store.begin();
/// store.set("a", 50).unwrap();
/// store.begin();
/// store.set("a", 60).unwrap();
/// assert_eq!(store.get("a").unwrap(), Value::Int(60));
///
/// store.rollback().unwrap();
/// assert_eq!(store.get("a").unwrap(), Value::Int(50));
/// store.commit().unwrap();
/// ```
#[derive(Debug)]
pub struct Store {
    manager: TransactionManager,
}

impl Store {
    /// Creates an ephemeral store backed by memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize.
    pub fn in_memory() -> StoreResult<Self> {
        Self::with_backend(Box::new(InMemoryBackend::new()))
    }

    /// Creates a store over an injected storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        Ok(Self {
            manager: TransactionManager::new(backend)?,
        })
    }

    /// Opens a durable store at the given file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is locked by
    /// another store.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Self::open_with_config(path, Config::default())
    }

    /// Opens a durable store with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened, does not exist
    /// while `create_if_missing` is off, or is locked by another
    /// store.
    pub fn open_with_config(path: &Path, config: Config) -> StoreResult<Self> {
        let options = FileBackendOptions {
            create_if_missing: config.create_if_missing,
            sync_on_commit: config.sync_on_commit,
        };
        Self::with_backend(Box::new(FileBackend::with_options(path, options)))
    }

    /// Begins a new transaction and returns its id.
    ///
    /// Transactions nest: a `begin` inside an active transaction opens
    /// an inner level whose commit merges into the outer one.
    pub fn begin(&mut self) -> TransactionId {
        self.manager.begin()
    }

    /// Sets a key-value pair in the current transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if no transaction is active.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> StoreResult<()> {
        self.ensure_active()?;
        self.manager.set(key, value.into())
    }

    /// Gets the visible value for a key.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if no transaction is active,
    /// `NotFound` if the key is absent or shadowed by a pending
    /// deletion, or `Backend` on a snapshot load failure.
    pub fn get(&mut self, key: &str) -> StoreResult<Value> {
        self.ensure_active()?;
        self.manager.get(key)
    }

    /// Deletes a key in the current transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if no transaction is active,
    /// `NotFound` if the key is not visible, or `Backend` on a
    /// snapshot load failure.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.ensure_active()?;
        self.manager.delete(key)
    }

    /// Commits the current transaction.
    ///
    /// An inner commit merges into the parent level; a top-level
    /// commit flushes atomically to the storage backend.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if no transaction is active, or
    /// `Backend` if a top-level flush fails.
    pub fn commit(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.manager.commit()
    }

    /// Rolls back the current transaction, discarding its changes.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if no transaction is active.
    pub fn rollback(&mut self) -> StoreResult<()> {
        self.ensure_active()?;
        self.manager.rollback()
    }

    /// Checks if a transaction is active.
    #[must_use]
    pub fn has_active_transaction(&self) -> bool {
        self.manager.has_active_transaction()
    }

    /// Returns the id of the current transaction, if any.
    #[must_use]
    pub fn current_transaction_id(&self) -> Option<TransactionId> {
        self.manager.current_transaction_id()
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub fn transaction_depth(&self) -> usize {
        self.manager.depth()
    }

    /// Returns a copy of the committed data.
    ///
    /// Diagnostic view of the committed snapshot; pending transaction
    /// state is not included.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the snapshot cannot be loaded.
    pub fn committed_data(&mut self) -> StoreResult<HashMap<String, Value>> {
        self.manager.committed_data()
    }

    /// Closes the store and releases its backend resources.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the backend fails to close.
    pub fn close(&mut self) -> StoreResult<()> {
        self.manager.close()
    }

    fn ensure_active(&self) -> StoreResult<()> {
        if self.manager.has_active_transaction() {
            Ok(())
        } else {
            Err(StoreError::NoActiveTransaction)
        }
    }
}
