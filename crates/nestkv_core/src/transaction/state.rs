//! Transaction state: one level of nesting.

use crate::error::{StoreError, StoreResult};
use crate::types::TransactionId;
use nestkv_value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// State of a transaction.
///
/// A transaction leaves `Active` exactly once, to either terminal
/// state, and is immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionState {
    /// Transaction is active and can record operations.
    Active,
    /// Transaction was merged into its parent or flushed to storage.
    Committed,
    /// Transaction was discarded.
    RolledBack,
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Active => f.write_str("active"),
            TransactionState::Committed => f.write_str("committed"),
            TransactionState::RolledBack => f.write_str("rolled back"),
        }
    }
}

/// One level of the nested transaction stack.
///
/// A transaction holds only the writes and deletions recorded at its
/// own level. A key is never pending as both a write and a deletion at
/// the same level: the latest operation wins.
#[derive(Debug)]
pub struct Transaction {
    id: TransactionId,
    state: TransactionState,
    /// Pending writes at this level.
    changes: HashMap<String, Value>,
    /// Pending deletions at this level.
    tombstones: HashSet<String>,
}

impl Transaction {
    /// Creates a new active transaction.
    pub(crate) fn new(id: TransactionId) -> Self {
        Self {
            id,
            state: TransactionState::Active,
            changes: HashMap::new(),
            tombstones: HashSet::new(),
        }
    }

    /// Returns the transaction id.
    #[must_use]
    pub fn id(&self) -> TransactionId {
        self.id
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Checks if the transaction is still active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }

    /// Records a write at this level.
    ///
    /// A write cancels an earlier pending deletion of the same key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransactionState` if the transaction is no
    /// longer active.
    pub fn set(&mut self, key: impl Into<String>, value: Value) -> StoreResult<()> {
        self.ensure_active()?;
        let key = key.into();
        self.tombstones.remove(&key);
        self.changes.insert(key, value);
        Ok(())
    }

    /// Records a deletion at this level.
    ///
    /// A deletion cancels an earlier pending write of the same key.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransactionState` if the transaction is no
    /// longer active.
    pub fn delete(&mut self, key: &str) -> StoreResult<()> {
        self.ensure_active()?;
        self.changes.remove(key);
        self.tombstones.insert(key.to_string());
        Ok(())
    }

    /// Checks if this level has a pending write for the key.
    #[must_use]
    pub fn has_key(&self, key: &str) -> bool {
        self.changes.contains_key(key)
    }

    /// Checks if this level has a pending deletion for the key.
    #[must_use]
    pub fn is_deleted(&self, key: &str) -> bool {
        self.tombstones.contains(key)
    }

    /// Returns the value pending at this level, if any.
    ///
    /// Scoped strictly to this level: returns `None` both for keys
    /// never touched here and for keys tombstoned here.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.changes.get(key)
    }

    /// Returns the pending writes at this level.
    #[must_use]
    pub fn changes(&self) -> &HashMap<String, Value> {
        &self.changes
    }

    /// Returns the pending deletions at this level.
    #[must_use]
    pub fn tombstones(&self) -> &HashSet<String> {
        &self.tombstones
    }

    /// Consumes the transaction into its pending writes and deletions.
    pub(crate) fn into_parts(self) -> (HashMap<String, Value>, HashSet<String>) {
        (self.changes, self.tombstones)
    }

    /// Marks the transaction as committed.
    pub(crate) fn mark_committed(&mut self) {
        self.state = TransactionState::Committed;
    }

    /// Marks the transaction as rolled back.
    pub(crate) fn mark_rolled_back(&mut self) {
        self.state = TransactionState::RolledBack;
    }

    fn ensure_active(&self) -> StoreResult<()> {
        if self.state == TransactionState::Active {
            Ok(())
        } else {
            Err(StoreError::InvalidTransactionState { state: self.state })
        }
    }
}
