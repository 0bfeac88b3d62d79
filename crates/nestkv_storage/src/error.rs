//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A value could not be serialized for storage.
    #[error("codec error: {0}")]
    Codec(#[from] nestkv_value::CodecError),

    /// The storage file is corrupted.
    #[error("storage corrupted: {0}")]
    Corrupted(String),

    /// Another handle holds the storage file lock.
    #[error("storage file locked: another store has exclusive access")]
    Locked,

    /// The storage backend is closed.
    #[error("storage is closed")]
    Closed,
}
