//! In-memory storage backend.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use nestkv_value::Value;
use std::collections::{HashMap, HashSet};

/// An in-memory storage backend.
///
/// This backend keeps the committed table in a process-local map and
/// is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral stores that don't need persistence
///
/// # Example
///
/// ```
/// use nestkv_storage::{InMemoryBackend, StorageBackend};
///
/// let mut backend = InMemoryBackend::new();
/// backend.initialize().unwrap();
/// assert!(backend.committed_data().unwrap().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    data: HashMap<String, Value>,
    closed: bool,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an in-memory backend with pre-existing committed data.
    ///
    /// Useful for testing stores against a known committed state.
    #[must_use]
    pub fn with_data(data: HashMap<String, Value>) -> Self {
        Self {
            data,
            closed: false,
        }
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.closed {
            return Err(StorageError::Closed);
        }
        Ok(())
    }
}

impl StorageBackend for InMemoryBackend {
    fn initialize(&mut self) -> StorageResult<()> {
        self.closed = false;
        Ok(())
    }

    fn committed_data(&self) -> StorageResult<HashMap<String, Value>> {
        self.ensure_open()?;
        Ok(self.data.clone())
    }

    fn commit_transaction(
        &mut self,
        changes: &HashMap<String, Value>,
        deletions: &HashSet<String>,
    ) -> StorageResult<()> {
        self.ensure_open()?;

        for (key, value) in changes {
            self.data.insert(key.clone(), value.clone());
        }
        for key in deletions {
            self.data.remove(key);
        }

        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn changes(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect()
    }

    fn deletions(keys: &[&str]) -> HashSet<String> {
        keys.iter().map(|k| (*k).to_string()).collect()
    }

    #[test]
    fn memory_new_is_empty() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();
        assert!(backend.committed_data().unwrap().is_empty());
    }

    #[test]
    fn memory_initialize_is_idempotent() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();
        backend.initialize().unwrap();
        assert!(backend.committed_data().unwrap().is_empty());
    }

    #[test]
    fn memory_commit_applies_changes_and_deletions() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();

        backend
            .commit_transaction(
                &changes(&[("a", Value::Int(1)), ("b", Value::Int(2))]),
                &HashSet::new(),
            )
            .unwrap();

        backend
            .commit_transaction(&changes(&[("c", Value::Int(3))]), &deletions(&["a"]))
            .unwrap();

        let data = backend.committed_data().unwrap();
        assert_eq!(data.len(), 2);
        assert!(!data.contains_key("a"));
        assert_eq!(data["b"], Value::Int(2));
        assert_eq!(data["c"], Value::Int(3));
    }

    #[test]
    fn memory_latest_value_wins() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();

        backend
            .commit_transaction(&changes(&[("k", Value::Int(1))]), &HashSet::new())
            .unwrap();
        backend
            .commit_transaction(&changes(&[("k", Value::Int(2))]), &HashSet::new())
            .unwrap();

        assert_eq!(backend.committed_data().unwrap()["k"], Value::Int(2));
    }

    #[test]
    fn memory_deleting_absent_key_is_harmless() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();

        backend
            .commit_transaction(&HashMap::new(), &deletions(&["ghost"]))
            .unwrap();

        assert!(backend.committed_data().unwrap().is_empty());
    }

    #[test]
    fn memory_with_data() {
        let backend = InMemoryBackend::with_data(changes(&[("seed", Value::Bool(true))]));
        assert_eq!(backend.committed_data().unwrap()["seed"], Value::Bool(true));
    }

    #[test]
    fn memory_closed_backend_rejects_operations() {
        let mut backend = InMemoryBackend::new();
        backend.initialize().unwrap();
        backend.close().unwrap();

        assert!(matches!(
            backend.committed_data(),
            Err(StorageError::Closed)
        ));
        assert!(matches!(
            backend.commit_transaction(&HashMap::new(), &HashSet::new()),
            Err(StorageError::Closed)
        ));

        // Close is idempotent, initialize reopens.
        backend.close().unwrap();
        backend.initialize().unwrap();
        assert!(backend.committed_data().is_ok());
    }
}
