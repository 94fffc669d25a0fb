//! Durable key-value storage used by the local backend.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;

/// Synchronous string store with an explicit lifecycle: `init` once, then
/// `read`/`write` whole values by key.
pub trait KeyValueStore: Send + Sync {
    /// Prepare the backing medium (create directories, open handles).
    fn init(&self) -> Result<(), StorageError>;

    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// One `<key>.json` file per key inside a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn init(&self) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(|error| StorageError::Write {
            key: self.dir.display().to_string(),
            message: error.to_string(),
        })
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(error) if error.kind() == std::io::ErrorKind::InvalidData => {
                Err(StorageError::Corrupted {
                    key: key.to_string(),
                    message: error.to_string(),
                })
            }
            Err(error) => Err(StorageError::Read {
                key: key.to_string(),
                message: error.to_string(),
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let write_error = |error: std::io::Error| StorageError::Write {
            key: key.to_string(),
            message: error.to_string(),
        };

        // Write-then-rename so a crash never leaves a half-written array.
        let path = self.path_for(key);
        let staging = path.with_extension("json.tmp");
        std::fs::write(&staging, value).map_err(write_error)?;
        std::fs::rename(&staging, &path).map_err(write_error)
    }
}

/// In-process store with an optional byte quota.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject any single value larger than `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: Mutex::default(),
            quota: Some(bytes),
        }
    }

    /// Place a raw value under `key`, bypassing the quota.
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.into());
    }

    pub fn get_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStore for MemoryStore {
    fn init(&self) -> Result<(), StorageError> {
        Ok(())
    }

    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.get_raw(key))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(quota) = self.quota {
            if value.len() > quota {
                return Err(StorageError::QuotaExceeded {
                    key: key.to_string(),
                    size: value.len(),
                });
            }
        }
        self.insert_raw(key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_store_reads_back_written_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("nested"));
        store.init().unwrap();

        assert_eq!(store.read("blog_posts").unwrap(), None);
        store.write("blog_posts", "[]").unwrap();
        assert_eq!(store.read("blog_posts").unwrap().as_deref(), Some("[]"));
        assert!(store.path_for("blog_posts").exists());
        assert!(!store.path_for("blog_posts").with_extension("json.tmp").exists());
    }

    #[test]
    fn file_store_write_fails_without_init() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("missing"));
        assert!(matches!(
            store.write("blog_posts", "[]"),
            Err(StorageError::Write { .. })
        ));
    }

    #[test]
    fn memory_store_enforces_quota() {
        let store = MemoryStore::with_quota(4);
        store.write("k", "1234").unwrap();
        assert!(matches!(
            store.write("k", "12345"),
            Err(StorageError::QuotaExceeded { size: 5, .. })
        ));
        assert_eq!(store.read("k").unwrap().as_deref(), Some("1234"));
    }
}
