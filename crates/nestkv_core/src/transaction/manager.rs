//! Transaction manager: the nested transaction state machine.

use crate::error::{StoreError, StoreResult};
use crate::transaction::state::Transaction;
use crate::types::TransactionId;
use nestkv_storage::StorageBackend;
use nestkv_value::Value;
use std::collections::HashMap;
use tracing::debug;

/// Manages the nested transaction stack over a storage backend.
///
/// The manager owns:
/// - The ordered transaction stack (last element = innermost level)
/// - The injected [`StorageBackend`] that top-level commits flush into
/// - The committed snapshot, a lazily loaded in-process view of the
///   backend's table, refreshed only after a successful top-level
///   commit
///
/// Reads walk the stack innermost→outermost, so an inner write or
/// deletion shadows everything outside it without any state being
/// copied between levels.
pub struct TransactionManager {
    /// The nesting stack, innermost last.
    stack: Vec<Transaction>,
    backend: Box<dyn StorageBackend>,
    /// Cached view of the backend's committed table.
    snapshot: HashMap<String, Value>,
    snapshot_loaded: bool,
}

impl TransactionManager {
    /// Creates a manager over the given backend.
    ///
    /// The backend is initialized here; the committed snapshot is
    /// loaded lazily on first read.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails to initialize.
    pub fn new(mut backend: Box<dyn StorageBackend>) -> StoreResult<Self> {
        backend.initialize()?;
        Ok(Self {
            stack: Vec::new(),
            backend,
            snapshot: HashMap::new(),
            snapshot_loaded: false,
        })
    }

    /// Begins a new transaction level and returns its id.
    ///
    /// The new level becomes the innermost; its parent is whatever was
    /// on top of the stack before (or nothing for a top-level begin).
    pub fn begin(&mut self) -> TransactionId {
        let id = TransactionId::mint();
        self.stack.push(Transaction::new(id));
        debug!(txid = %id, depth = self.stack.len(), "transaction begun");
        id
    }

    /// Gets the visible value for a key.
    ///
    /// Scans the stack innermost→outermost: the first level that
    /// tombstones the key hides it entirely; the first level with a
    /// pending write wins. If no level mentions the key, falls through
    /// to the committed snapshot.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the key is absent or shadowed by a
    /// deletion, or `Backend` if the snapshot cannot be loaded.
    pub fn get(&mut self, key: &str) -> StoreResult<Value> {
        for txn in self.stack.iter().rev() {
            if txn.is_deleted(key) {
                return Err(StoreError::not_found(key));
            }
            if let Some(value) = txn.value(key) {
                return Ok(value.clone());
            }
        }

        let snapshot = self.load_snapshot()?;
        snapshot
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::not_found(key))
    }

    /// Records a write in the innermost transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if the stack is empty.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> StoreResult<()> {
        match self.stack.last_mut() {
            Some(top) => top.set(key, value),
            None => Err(StoreError::NoActiveTransaction),
        }
    }

    /// Records a deletion in the innermost transaction.
    ///
    /// The key must be visible (same check as [`Self::get`]): deleting
    /// a key that no level or the snapshot holds fails `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if the stack is empty, `NotFound`
    /// if the key is not visible, or `Backend` if the snapshot cannot
    /// be loaded.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        if self.stack.is_empty() {
            return Err(StoreError::NoActiveTransaction);
        }
        self.get(key)?;

        match self.stack.last_mut() {
            Some(top) => top.delete(key),
            None => Err(StoreError::NoActiveTransaction),
        }
    }

    /// Commits the innermost transaction.
    ///
    /// Nested case: the popped level's writes and deletions are
    /// replayed onto the new top, exactly as if they had been
    /// performed there directly; the child always overrides the parent
    /// for the same key. Top-level case: the payload goes to the
    /// backend as one atomic unit and the committed snapshot is
    /// refreshed from the backend's authoritative post-commit state.
    ///
    /// A failed top-level commit leaves the snapshot untouched and
    /// does not re-push the popped transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if the stack is empty, or
    /// `Backend` if the flush fails.
    pub fn commit(&mut self) -> StoreResult<()> {
        let mut txn = self.stack.pop().ok_or(StoreError::NoActiveTransaction)?;
        let txid = txn.id();

        if self.stack.is_empty() {
            self.backend
                .commit_transaction(txn.changes(), txn.tombstones())?;
            txn.mark_committed();
            self.refresh_snapshot()?;
            debug!(txid = %txid, "top-level transaction committed");
            return Ok(());
        }

        txn.mark_committed();
        let (changes, tombstones) = txn.into_parts();
        if let Some(parent) = self.stack.last_mut() {
            for (key, value) in changes {
                parent.set(key, value)?;
            }
            for key in tombstones {
                parent.delete(&key)?;
            }
        }
        debug!(txid = %txid, depth = self.stack.len(), "nested transaction merged into parent");
        Ok(())
    }

    /// Rolls back the innermost transaction.
    ///
    /// Its pending writes and deletions are discarded; no I/O happens
    /// and neither the parent level nor the backend is affected.
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTransaction` if the stack is empty.
    pub fn rollback(&mut self) -> StoreResult<()> {
        let mut txn = self.stack.pop().ok_or(StoreError::NoActiveTransaction)?;
        txn.mark_rolled_back();
        debug!(txid = %txn.id(), depth = self.stack.len(), "transaction rolled back");
        Ok(())
    }

    /// Checks if any transaction is active.
    #[must_use]
    pub fn has_active_transaction(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Returns the id of the innermost transaction, if any.
    #[must_use]
    pub fn current_transaction_id(&self) -> Option<TransactionId> {
        self.stack.last().map(Transaction::id)
    }

    /// Returns the current nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns a copy of the committed snapshot.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the snapshot cannot be loaded.
    pub fn committed_data(&mut self) -> StoreResult<HashMap<String, Value>> {
        Ok(self.load_snapshot()?.clone())
    }

    /// Closes the underlying backend.
    ///
    /// # Errors
    ///
    /// Returns `Backend` if the backend fails to close.
    pub fn close(&mut self) -> StoreResult<()> {
        self.backend.close()?;
        Ok(())
    }

    fn load_snapshot(&mut self) -> StoreResult<&HashMap<String, Value>> {
        if !self.snapshot_loaded {
            self.snapshot = self.backend.committed_data()?;
            self.snapshot_loaded = true;
        }
        Ok(&self.snapshot)
    }

    /// Re-reads the authoritative committed table after a confirmed
    /// top-level commit, guarding against backend-side normalization.
    fn refresh_snapshot(&mut self) -> StoreResult<()> {
        self.snapshot_loaded = false;
        self.snapshot = self.backend.committed_data()?;
        self.snapshot_loaded = true;
        Ok(())
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("depth", &self.depth())
            .field("snapshot_loaded", &self.snapshot_loaded)
            .finish_non_exhaustive()
    }
}
