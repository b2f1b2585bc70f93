//! Key/value document storage used by the local backend.
//!
//! Each collection is one JSON document mapping id to record. A mutation
//! reads the whole document, changes it and writes it back, so a single
//! write is the unit of atomicity.

use std::collections::{BTreeMap, HashMap};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;

use deskbook_core::storage::PersistenceError;

pub const BOOKINGS_KEY: &str = "deskbook.bookings";
pub const EXPENSES_KEY: &str = "deskbook.expenses";
pub const RECURRING_EXPENSES_KEY: &str = "deskbook.recurring-expenses";
pub const WAITING_LIST_KEY: &str = "deskbook.waiting-list";

/// Raw document access by well-known key.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    /// Reads a document. Returns `None` if it was never written.
    async fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replaces a document.
    async fn write(&self, key: &str, contents: &str) -> Result<(), PersistenceError>;

    /// Deletes a document. Deleting a missing document is a no-op.
    async fn remove(&self, key: &str) -> Result<(), PersistenceError>;
}

/// Loads a collection document, treating a missing document as empty.
pub async fn load_collection<T: DeserializeOwned>(
    storage: &dyn DocumentStorage,
    key: &str,
) -> Result<BTreeMap<String, T>, PersistenceError> {
    match storage.read(key).await? {
        None => Ok(BTreeMap::new()),
        Some(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
        Some(raw) => serde_json::from_str(&raw)
            .map_err(|e| PersistenceError::Serialization(format!("{key}: {e}"))),
    }
}

/// Writes a whole collection document.
pub async fn store_collection<T: Serialize>(
    storage: &dyn DocumentStorage,
    key: &str,
    records: &BTreeMap<String, T>,
) -> Result<(), PersistenceError> {
    let raw = serde_json::to_string(records)
        .map_err(|e| PersistenceError::Serialization(format!("{key}: {e}")))?;
    storage.write(key, &raw).await
}

/// Documents stored as `{dir}/{key}.json`.
#[derive(Debug, Clone)]
pub struct FileDocumentStorage {
    dir: PathBuf,
}

impl FileDocumentStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

fn map_io_error(path: &Path, err: std::io::Error) -> PersistenceError {
    let message = format!("{}: {err}", path.display());
    match err.kind() {
        ErrorKind::StorageFull | ErrorKind::FileTooLarge => {
            PersistenceError::QuotaExceeded(message)
        }
        _ => PersistenceError::Io(message),
    }
}

#[async_trait]
impl DocumentStorage for FileDocumentStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(map_io_error(&path, err)),
        }
    }

    async fn write(&self, key: &str, contents: &str) -> Result<(), PersistenceError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| map_io_error(&self.dir, e))?;

        // Write then rename so readers never observe a half-written document
        let path = self.path_for(key);
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| map_io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| map_io_error(&path, e))
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(map_io_error(&path, err)),
        }
    }
}

/// Volatile documents with an optional byte quota over all keys.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStorage {
    documents: Arc<RwLock<HashMap<String, String>>>,
    quota_bytes: Option<usize>,
}

impl MemoryDocumentStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rejects any write that would push the total size past `bytes`.
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            quota_bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Total bytes currently stored.
    pub async fn used_bytes(&self) -> usize {
        self.documents.read().await.values().map(String::len).sum()
    }
}

#[async_trait]
impl DocumentStorage for MemoryDocumentStorage {
    async fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn write(&self, key: &str, contents: &str) -> Result<(), PersistenceError> {
        let mut documents = self.documents.write().await;

        if let Some(quota) = self.quota_bytes {
            let others: usize = documents
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + contents.len();
            if needed > quota {
                return Err(PersistenceError::QuotaExceeded(format!(
                    "{key}: {needed} bytes exceeds quota of {quota}"
                )));
            }
        }

        documents.insert(key.to_string(), contents.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), PersistenceError> {
        self.documents.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_collection_is_empty() {
        let storage = MemoryDocumentStorage::new();
        let records: BTreeMap<String, u32> = load_collection(&storage, BOOKINGS_KEY).await.unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn test_collection_roundtrip() {
        let storage = MemoryDocumentStorage::new();
        let mut records = BTreeMap::new();
        records.insert("a".to_string(), 1u32);

        store_collection(&storage, EXPENSES_KEY, &records).await.unwrap();
        let loaded: BTreeMap<String, u32> = load_collection(&storage, EXPENSES_KEY).await.unwrap();

        assert_eq!(loaded, records);
    }

    #[tokio::test]
    async fn test_corrupt_document_is_serialization_error() {
        let storage = MemoryDocumentStorage::new();
        storage.write(BOOKINGS_KEY, "{not json").await.unwrap();

        let result: Result<BTreeMap<String, u32>, _> = load_collection(&storage, BOOKINGS_KEY).await;

        assert!(matches!(result, Err(PersistenceError::Serialization(_))));
    }

    #[tokio::test]
    async fn test_memory_quota() {
        let storage = MemoryDocumentStorage::with_quota(10);

        storage.write("a", "12345").await.unwrap();
        storage.write("a", "1234567890").await.unwrap();
        let result = storage.write("b", "1").await;

        assert!(matches!(result, Err(PersistenceError::QuotaExceeded(_))));
        assert_eq!(storage.read("b").await.unwrap(), None);
        assert_eq!(storage.used_bytes().await, 10);
    }

    #[tokio::test]
    async fn test_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileDocumentStorage::new(dir.path().join("data"));

        assert_eq!(storage.read(WAITING_LIST_KEY).await.unwrap(), None);

        storage.write(WAITING_LIST_KEY, "{}").await.unwrap();
        assert_eq!(
            storage.read(WAITING_LIST_KEY).await.unwrap(),
            Some("{}".to_string())
        );
        assert!(dir.path().join("data/deskbook.waiting-list.json").exists());

        storage.remove(WAITING_LIST_KEY).await.unwrap();
        storage.remove(WAITING_LIST_KEY).await.unwrap();
        assert_eq!(storage.read(WAITING_LIST_KEY).await.unwrap(), None);
    }
}
