//! Core type definitions for nestkv.

use std::fmt;
use uuid::Uuid;

/// Unique identifier for a transaction.
///
/// Transaction ids are opaque tokens minted at `begin()`; callers
/// should treat them as strings with no internal structure. Ids are
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Mints a fresh transaction id.
    #[must_use]
    pub(crate) fn mint() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
