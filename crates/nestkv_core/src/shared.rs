//! Serialized-concurrent store handle.

use crate::config::Config;
use crate::error::StoreResult;
use crate::store::Store;
use crate::types::TransactionId;
use nestkv_storage::StorageBackend;
use nestkv_value::Value;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// A cloneable, serialized handle to one store instance.
///
/// `SharedStore` is the serialized-concurrent operating mode: a single
/// mutex guards every operation end-to-end, so two operations on the
/// same instance never execute concurrently. Many independent logical
/// sessions can safely interleave begin/set/get/commit/rollback
/// sequences through clones of one handle, provided each session's own
/// sequence is sequential.
///
/// The lock is held for the whole logical operation, including backend
/// I/O, and is never re-acquired within one call chain. Blocking on
/// the lock or on file I/O suspends only the calling thread; there is
/// no cancellation and no timeout.
///
/// # Example
///
/// ```
/// use nestkv_core::SharedStore;
///
/// let store = SharedStore::in_memory().unwrap();
/// let handle = store.clone();
///
/// let worker = std::thread::spawn(move || {
///     handle.begin();
///     handle.set("from-worker", 1).unwrap();
///     handle.commit().unwrap();
/// });
/// worker.join().unwrap();
///
/// assert_eq!(store.committed_data().unwrap().len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    /// Wraps a store in a serialized shared handle.
    #[must_use]
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    /// Creates a shared ephemeral store backed by memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize.
    pub fn in_memory() -> StoreResult<Self> {
        Ok(Self::new(Store::in_memory()?))
    }

    /// Creates a shared store over an injected storage backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize.
    pub fn with_backend(backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        Ok(Self::new(Store::with_backend(backend)?))
    }

    /// Opens a shared durable store at the given file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is locked.
    pub fn open(path: &Path) -> StoreResult<Self> {
        Ok(Self::new(Store::open(path)?))
    }

    /// Opens a shared durable store with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is locked.
    pub fn open_with_config(path: &Path, config: Config) -> StoreResult<Self> {
        Ok(Self::new(Store::open_with_config(path, config)?))
    }

    /// Begins a new transaction and returns its id.
    pub fn begin(&self) -> TransactionId {
        self.inner.lock().begin()
    }

    /// Sets a key-value pair in the current transaction.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::set`].
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> StoreResult<()> {
        self.inner.lock().set(key, value)
    }

    /// Gets the visible value for a key.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::get`].
    pub fn get(&self, key: &str) -> StoreResult<Value> {
        self.inner.lock().get(key)
    }

    /// Deletes a key in the current transaction.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::delete`].
    pub fn delete(&self, key: &str) -> StoreResult<()> {
        self.inner.lock().delete(key)
    }

    /// Commits the current transaction.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::commit`].
    pub fn commit(&self) -> StoreResult<()> {
        self.inner.lock().commit()
    }

    /// Rolls back the current transaction.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::rollback`].
    pub fn rollback(&self) -> StoreResult<()> {
        self.inner.lock().rollback()
    }

    /// Checks if a transaction is active.
    #[must_use]
    pub fn has_active_transaction(&self) -> bool {
        self.inner.lock().has_active_transaction()
    }

    /// Returns the id of the current transaction, if any.
    #[must_use]
    pub fn current_transaction_id(&self) -> Option<TransactionId> {
        self.inner.lock().current_transaction_id()
    }

    /// Returns a copy of the committed data.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::committed_data`].
    pub fn committed_data(&self) -> StoreResult<HashMap<String, Value>> {
        self.inner.lock().committed_data()
    }

    /// Closes the store and releases its backend resources.
    ///
    /// # Errors
    ///
    /// Same taxonomy as [`Store::close`].
    pub fn close(&self) -> StoreResult<()> {
        self.inner.lock().close()
    }
}
