//! Nested transaction management.
//!
//! A store's live nesting is an ordered stack of transactions, last
//! element innermost. Each level records only its own pending writes
//! and pending deletions; reads walk the stack top-down and fall
//! through to the committed snapshot. Committing an inner level
//! replays it onto its parent; committing the last level flushes one
//! atomic payload to the storage backend.

mod manager;
mod state;

pub use manager::TransactionManager;
pub use state::{Transaction, TransactionState};
