use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// StorageError
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage key '{0}' is empty after sanitization")]
    InvalidKey(String),
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("simulated storage failure")]
    Simulated,
}

/// StorageService
///
/// The contract for persisting uploaded files. Handlers only ever see this trait, so
/// the local disk implementation can be swapped for the in-memory mock in tests.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the storage root if it does not exist. Called once at startup.
    async fn ensure_root_exists(&self) -> Result<(), StorageError>;

    /// Writes `bytes` under `key` and returns the public URL of the stored file.
    async fn store(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Removes the file under `key`. Removing a missing file is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// sanitize_key
///
/// Strips empty, `.` and `..` segments so a key can never leave the storage root.
pub fn sanitize_key(key: &str) -> String {
    key.split(['/', '\\'])
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn checked_key(key: &str) -> Result<String, StorageError> {
    let sanitized = sanitize_key(key);
    if sanitized.is_empty() {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(sanitized)
}

/// LocalDiskStorage
///
/// Stores files under `root` and serves them at `url_prefix/<key>` (the router mounts
/// the directory with `ServeDir`).
#[derive(Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
    url_prefix: String,
}

impl LocalDiskStorage {
    pub fn new(root: impl Into<PathBuf>, url_prefix: &str) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl StorageService for LocalDiskStorage {
    async fn ensure_root_exists(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    async fn store(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let key = checked_key(key)?;
        let path = self.root.join(&key);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), size = bytes.len(), "stored upload");
        Ok(format!("{}/{}", self.url_prefix, key))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        let path = self.root.join(checked_key(key)?);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// MockStorageService
///
/// Keeps stored files in memory so upload handlers can be tested without touching disk.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every operation fails with `StorageError::Simulated`.
    pub should_fail: bool,
    files: Arc<Mutex<Vec<(String, Vec<u8>)>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Bytes stored under `key`, if any.
    pub fn stored(&self, key: &str) -> Option<Vec<u8>> {
        let files = self.files.lock().ok()?;
        files.iter().find(|(k, _)| k == key).map(|(_, b)| b.clone())
    }

    pub fn stored_keys(&self) -> Vec<String> {
        self.files
            .lock()
            .map(|files| files.iter().map(|(k, _)| k.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_root_exists(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn store(&self, key: &str, bytes: &[u8]) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Simulated);
        }
        let key = checked_key(key)?;
        if let Ok(mut files) = self.files.lock() {
            files.retain(|(k, _)| *k != key);
            files.push((key.clone(), bytes.to_vec()));
        }
        Ok(format!("/uploads/{key}"))
    }

    async fn remove(&self, key: &str) -> Result<(), StorageError> {
        if self.should_fail {
            return Err(StorageError::Simulated);
        }
        let key = checked_key(key)?;
        if let Ok(mut files) = self.files.lock() {
            files.retain(|(k, _)| *k != key);
        }
        Ok(())
    }
}

/// StorageState
///
/// The concrete type used to share the storage service across the application state.
pub type StorageState = Arc<dyn StorageService>;
