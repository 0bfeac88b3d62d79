//! Error types for the nestkv core.

use crate::transaction::TransactionState;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in nestkv store operations.
///
/// This is the stable taxonomy surfaced to callers: every public
/// operation either returns its documented result or fails with
/// exactly one of these variants.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key is absent at every visible transaction level and in the
    /// committed snapshot, or shadowed by a pending deletion.
    #[error("key not found: {key}")]
    NotFound {
        /// The key that was looked up.
        key: String,
    },

    /// A mutating, commit, or rollback call was made with no
    /// transaction on the stack.
    #[error("no active transaction: call begin() first")]
    NoActiveTransaction,

    /// Internal guard against mutating a transaction that already
    /// committed or rolled back. Unreachable through the public facade
    /// in correct usage.
    #[error("transaction is not active (state: {state})")]
    InvalidTransactionState {
        /// The terminal state the transaction is in.
        state: TransactionState,
    },

    /// The storage backend failed during a commit or load.
    #[error("storage backend error: {0}")]
    Backend(#[from] nestkv_storage::StorageError),
}

impl StoreError {
    /// Creates a not-found error for the given key.
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }
}
