//! Durable key/value storage.
//!
//! The story wall keeps everything under a single key of a small key/value
//! surface, the same shape as a browser profile's local storage. Two
//! implementations are provided:
//! - [`FileStorage`] keeps a JSON object of `key -> string` in one file
//! - [`MemoryStorage`] keeps entries in a shared map for tests and throwaway sessions
//!
//! Both can enforce a byte quota so that oversized payloads (large embedded
//! photos, mostly) fail the same way they would in a browser.

use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Default quota, matching the usual browser local storage allowance.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Errors from storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage quota exceeded: {attempted} bytes requested, limit is {limit} bytes")]
    QuotaExceeded { limit: usize, attempted: usize },
}

/// A string key/value store with get/set semantics.
pub trait KeyValueStorage: Send {
    /// Read the value stored under `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn check_quota(quota: Option<usize>, attempted: usize) -> Result<(), StorageError> {
    match quota {
        Some(limit) if attempted > limit => Err(StorageError::QuotaExceeded { limit, attempted }),
        _ => Ok(()),
    }
}

/// Key/value storage backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Create storage at `path` with the default quota.
    ///
    /// The file is created lazily on the first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            quota: Some(DEFAULT_QUOTA_BYTES),
        }
    }

    /// Set the byte quota. `None` disables the limit.
    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl KeyValueStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_entries()?.remove(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = match self.read_entries() {
            Ok(entries) => entries,
            // A file that is not a JSON object cannot be merged into; replace it
            Err(StorageError::Json(e)) => {
                tracing::warn!(path = %self.path.display(), error = %e, "storage file is not a JSON object; rewriting it");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };

        entries.insert(key.to_string(), value.to_string());
        let attempted: usize = entries.iter().map(|(k, v)| k.len() + v.len()).sum();
        check_quota(self.quota, attempted)?;

        let content = serde_json::to_string(&entries)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        // Write then rename so a crash never leaves a half-written file behind
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

/// In-memory key/value storage.
///
/// Clones share the same entries, so a test can keep a handle while the
/// store owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
    quota: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    /// Seed a raw value, bypassing the quota.
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
    }

    /// Read a raw value.
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.raw(key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let others: usize = entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum();
        check_quota(self.quota, others + key.len() + value.len())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_missing_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let storage = FileStorage::new(dir.path().join("absent.json"));
        assert!(storage.get("anything").unwrap().is_none());
    }

    #[test]
    fn test_file_storage_set_and_get() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("nested").join("storage.json");
        let mut storage = FileStorage::new(&path);

        storage.set("a", "[1,2]").unwrap();
        storage.set("b", "hello").unwrap();
        storage.set("a", "[]").unwrap();

        assert!(path.exists());
        assert_eq!(storage.get("a").unwrap().as_deref(), Some("[]"));
        assert_eq!(storage.get("b").unwrap().as_deref(), Some("hello"));

        // A second handle on the same file sees the same entries
        let reopened = FileStorage::new(&path);
        assert_eq!(reopened.get("b").unwrap().as_deref(), Some("hello"));
    }

    #[test]
    fn test_file_storage_corrupt_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "not json at all").unwrap();

        let mut storage = FileStorage::new(&path);
        assert!(matches!(storage.get("k"), Err(StorageError::Json(_))));

        // Writing recovers the file
        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_file_storage_quota() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("storage.json");
        let mut storage = FileStorage::new(&path).with_quota(Some(16));

        storage.set("k", "short").unwrap();
        let err = storage.set("k", &"x".repeat(64)).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 16, .. }));

        // The previous value survives a rejected write
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("short"));
    }

    #[test]
    fn test_memory_storage_clones_share_entries() {
        let handle = MemoryStorage::new();
        let mut owned = handle.clone();
        owned.set("key", "value").unwrap();
        assert_eq!(handle.raw("key").as_deref(), Some("value"));
    }

    #[test]
    fn test_memory_storage_quota_replaces_same_key() {
        let mut storage = MemoryStorage::new().with_quota(Some(10));
        storage.set("k", "12345678").unwrap();
        // Replacing the value only counts the new value
        storage.set("k", "87654321").unwrap();
        assert!(storage.set("k", "123456789012").is_err());
        assert_eq!(storage.raw("k").as_deref(), Some("87654321"));
    }
}
