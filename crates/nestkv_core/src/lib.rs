//! # nestkv Core
//!
//! Embeddable key-value store with nested transactions and pluggable
//! durability.
//!
//! This crate provides:
//! - [`Store`] - the transactional facade over one logical session
//! - [`SharedStore`] - the same store serialized behind a single lock
//!   for many interleaved sessions
//! - [`TransactionManager`] - the nested transaction stack with
//!   merge-on-commit and discard-on-rollback semantics
//! - A stable error taxonomy ([`StoreError`])
//!
//! Durability is pluggable: any [`nestkv_storage::StorageBackend`] can
//! be injected at construction. Only a top-level commit touches the
//! backend; inner commits merge into their parent level.
//!
//! ## Example
//!
//! ```
//! use nestkv_core::Store;
//! use nestkv_value::Value;
//!
//! let mut store = Store::in_memory().unwrap();
//!
//! store.begin();
//! store.set("user", "alice").unwrap();
//!
//! store.begin();
//! store.set("user", "bob").unwrap();
//! store.rollback().unwrap();
//!
//! assert_eq!(store.get("user").unwrap(), Value::from("alice"));
//! store.commit().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod shared;
mod store;
mod transaction;
mod types;

pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use shared::SharedStore;
pub use store::Store;
pub use transaction::{Transaction, TransactionManager, TransactionState};
pub use types::TransactionId;

// Re-exported so embedders can name values and inject backends
// without depending on the leaf crates directly.
pub use nestkv_storage::{
    FileBackend, FileBackendOptions, InMemoryBackend, StorageBackend, StorageError,
};
pub use nestkv_value::Value;
