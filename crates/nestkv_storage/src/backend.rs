//! Storage backend trait definition.

use crate::error::StorageResult;
use nestkv_value::Value;
use std::collections::{HashMap, HashSet};

/// A committed-data store for nestkv.
///
/// Storage backends hold the durable table of committed key→value
/// pairs. They know nothing about transaction nesting - the
/// transaction layer merges nested levels and hands a backend one
/// flat payload per top-level commit.
///
/// # Invariants
///
/// - `initialize` is idempotent while the backend is open
/// - `commit_transaction` applies all changes and all deletions as a
///   single atomic unit; on failure the committed table is unchanged
/// - `committed_data` returns the full post-commit table, latest value
///   per key
/// - Backends must be `Send + Sync` so a store can be shared behind a
///   lock
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - Ephemeral, for testing
/// - [`super::FileBackend`] - Durable single-file storage
pub trait StorageBackend: Send + Sync {
    /// Prepares the backend for use.
    ///
    /// Calling this on an already-open backend is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing resource cannot be acquired or
    /// its contents cannot be loaded.
    fn initialize(&mut self) -> StorageResult<()>;

    /// Returns the full committed key→value table.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or the table cannot
    /// be read.
    fn committed_data(&self) -> StorageResult<HashMap<String, Value>>;

    /// Applies a top-level transaction's payload atomically.
    ///
    /// All `changes` are upserted and all `deletions` removed as one
    /// unit. The two sets are disjoint by construction, so apply order
    /// is unambiguous.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend is closed or the write fails;
    /// on failure the committed table is left unchanged.
    fn commit_transaction(
        &mut self,
        changes: &HashMap<String, Value>,
        deletions: &HashSet<String>,
    ) -> StorageResult<()>;

    /// Releases the backend's resources.
    ///
    /// Closing an already-closed backend is a no-op. Any other
    /// operation after close fails with [`crate::StorageError::Closed`].
    ///
    /// # Errors
    ///
    /// Returns an error if releasing the backing resource fails.
    fn close(&mut self) -> StorageResult<()>;
}
