//! File-based storage backend for durable storage.

use crate::backend::StorageBackend;
use crate::error::{StorageError, StorageResult};
use fs2::FileExt;
use nestkv_value::{from_json_text, to_json_text, Value};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Options for opening a [`FileBackend`].
#[derive(Debug, Clone)]
pub struct FileBackendOptions {
    /// Whether to treat a missing data file as a new empty store.
    pub create_if_missing: bool,

    /// Whether to fsync the staged table before the atomic rename
    /// (safer but slower).
    pub sync_on_commit: bool,
}

impl Default for FileBackendOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_commit: true,
        }
    }
}

/// One stored row: a key and the JSON text of its value.
///
/// Values are kept as their own serialized text so each row decodes
/// independently of the rest of the table.
#[derive(Debug, Serialize, Deserialize)]
struct Row {
    key: String,
    value: String,
}

/// A durable file-based storage backend.
///
/// The committed table lives in a single JSON-Lines file, one row per
/// key. A commit rewrites the whole post-commit table into a staged
/// temporary file in the same directory and atomically renames it over
/// the data file, so the table on disk is always a complete committed
/// state: a failure anywhere before the rename leaves the previous
/// state untouched.
///
/// A sidecar `<file>.lock` is held exclusively while the backend is
/// open; a second opener fails with [`StorageError::Locked`].
///
/// # Example
///
/// ```no_run
/// use nestkv_storage::{FileBackend, StorageBackend};
/// use std::path::Path;
///
/// let mut backend = FileBackend::new(Path::new("store.ndjson"));
/// backend.initialize().unwrap();
/// let data = backend.committed_data().unwrap();
/// ```
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    options: FileBackendOptions,
    /// Key → serialized value text. Mirrors the on-disk table while open.
    rows: HashMap<String, String>,
    /// Held exclusively while open; `Some` ⇔ the backend is open.
    lock_file: Option<File>,
}

impl FileBackend {
    /// Creates a file backend for the given data file path.
    ///
    /// No I/O happens until [`StorageBackend::initialize`] is called.
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self::with_options(path, FileBackendOptions::default())
    }

    /// Creates a file backend with explicit options.
    #[must_use]
    pub fn with_options(path: &Path, options: FileBackendOptions) -> Self {
        Self {
            path: path.to_path_buf(),
            options,
            rows: HashMap::new(),
            lock_file: None,
        }
    }

    /// Returns the path to the data file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn ensure_open(&self) -> StorageResult<()> {
        if self.lock_file.is_none() {
            return Err(StorageError::Closed);
        }
        Ok(())
    }

    fn parse_rows(text: &str) -> StorageResult<HashMap<String, String>> {
        let mut rows = HashMap::new();
        for (index, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let row: Row = serde_json::from_str(line).map_err(|e| {
                StorageError::Corrupted(format!("malformed row at line {}: {e}", index + 1))
            })?;
            rows.insert(row.key, row.value);
        }
        Ok(rows)
    }

    /// Stages the full table in a temp file and renames it into place.
    fn write_table(&self, table: &HashMap<String, String>) -> StorageResult<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut staged = NamedTempFile::new_in(dir)?;

        let mut keys: Vec<&String> = table.keys().collect();
        keys.sort();
        for key in keys {
            let row = Row {
                key: key.clone(),
                value: table[key].clone(),
            };
            let line = serde_json::to_string(&row).map_err(io::Error::other)?;
            writeln!(staged, "{line}")?;
        }

        staged.flush()?;
        if self.options.sync_on_commit {
            staged.as_file().sync_all()?;
        }
        staged
            .persist(&self.path)
            .map_err(|e| StorageError::Io(e.error))?;

        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn initialize(&mut self) -> StorageResult<()> {
        if self.lock_file.is_some() {
            return Ok(());
        }

        if self.options.create_if_missing {
            if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
        }

        let lock = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.lock_path())?;
        lock.try_lock_exclusive()
            .map_err(|_| StorageError::Locked)?;

        // The lock guard stays local until the load succeeds, so a
        // failed open releases it on the error path.
        let rows = match std::fs::read_to_string(&self.path) {
            Ok(text) => Self::parse_rows(&text)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                if self.options.create_if_missing {
                    HashMap::new()
                } else {
                    return Err(StorageError::Io(e));
                }
            }
            Err(e) => return Err(StorageError::Io(e)),
        };

        info!(
            path = %self.path.display(),
            rows = rows.len(),
            "opened file backend"
        );

        self.rows = rows;
        self.lock_file = Some(lock);
        Ok(())
    }

    fn committed_data(&self) -> StorageResult<HashMap<String, Value>> {
        self.ensure_open()?;

        let mut data = HashMap::with_capacity(self.rows.len());
        for (key, raw) in &self.rows {
            let value = match from_json_text(raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key = %key, error = %e, "stored value is not valid JSON, keeping raw text");
                    Value::Text(raw.clone())
                }
            };
            data.insert(key.clone(), value);
        }
        Ok(data)
    }

    fn commit_transaction(
        &mut self,
        changes: &HashMap<String, Value>,
        deletions: &HashSet<String>,
    ) -> StorageResult<()> {
        self.ensure_open()?;

        let mut next = self.rows.clone();
        for (key, value) in changes {
            next.insert(key.clone(), to_json_text(value)?);
        }
        for key in deletions {
            next.remove(key);
        }

        self.write_table(&next)?;
        self.rows = next;

        debug!(
            changes = changes.len(),
            deletions = deletions.len(),
            rows = self.rows.len(),
            "committed to file backend"
        );
        Ok(())
    }

    fn close(&mut self) -> StorageResult<()> {
        if let Some(lock) = self.lock_file.take() {
            lock.unlock()?;
            self.rows.clear();
        }
        Ok(())
    }
}
