//! # nestkv Storage
//!
//! Storage backend trait and implementations for nestkv.
//!
//! This crate provides the committed-data layer of nestkv. A storage
//! backend holds one durable table of committed key→value pairs; the
//! transaction layer above it decides *what* gets committed, backends
//! only apply a committed payload atomically and hand back the
//! authoritative table.
//!
//! ## Available backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral stores
//! - [`FileBackend`] - Durable single-file storage with atomic commits
//!
//! ## Example
//!
//! ```
//! use nestkv_storage::{InMemoryBackend, StorageBackend};
//! use nestkv_value::Value;
//! use std::collections::{HashMap, HashSet};
//!
//! let mut backend = InMemoryBackend::new();
//! backend.initialize().unwrap();
//!
//! let mut changes = HashMap::new();
//! changes.insert("greeting".to_string(), Value::from("hello"));
//! backend.commit_transaction(&changes, &HashSet::new()).unwrap();
//!
//! let data = backend.committed_data().unwrap();
//! assert_eq!(data["greeting"], Value::from("hello"));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StorageBackend;
pub use error::{StorageError, StorageResult};
pub use file::{FileBackend, FileBackendOptions};
pub use memory::InMemoryBackend;
