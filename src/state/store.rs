//! Blob-like key/value storage for the persisted state

use crate::error::PersistError;
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Minimal object store capability
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, PersistError>;

    async fn read(&self, key: &str) -> Result<Vec<u8>, PersistError>;

    /// Replace the whole object. Readers see either the old or the new bytes.
    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError>;

    /// Human readable location, for logs
    fn describe(&self) -> String;
}

// =============================================================================
// Filesystem store
// =============================================================================

/// Stores each object as a file under `<root>/<container>/`
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    container_dir: PathBuf,
}

impl FsBlobStore {
    /// `connection_string` is a directory path, optionally prefixed with `file://`.
    /// The container directory is created on first write.
    pub fn new(connection_string: &str, container: &str) -> Result<Self, PersistError> {
        validate_key(container)?;
        let root = connection_string
            .strip_prefix("file://")
            .unwrap_or(connection_string);
        if root.trim().is_empty() {
            return Err(PersistError::Unavailable(
                "store connection string is empty".to_string(),
            ));
        }

        Ok(Self {
            container_dir: Path::new(root).join(container),
        })
    }

    pub fn container_dir(&self) -> &Path {
        &self.container_dir
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, PersistError> {
        validate_key(key)?;
        Ok(self.container_dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, PersistError> {
        let path = self.object_path(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|source| io_error(key, source))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, PersistError> {
        let path = self.object_path(key)?;
        tokio::fs::read(&path)
            .await
            .map_err(|source| io_error(key, source))
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError> {
        let path = self.object_path(key)?;
        let dir = self.container_dir.clone();
        let owned_key = key.to_string();

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(|err| PersistError::Unavailable(format!("write task failed: {err}")))?
            .map_err(|source| io_error(&owned_key, source))
    }

    fn describe(&self) -> String {
        self.container_dir.display().to_string()
    }
}

/// Write to a temp file in `dir`, then rename it over `path`
fn write_atomic(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

fn io_error(key: &str, source: std::io::Error) -> PersistError {
    PersistError::Io {
        key: key.to_string(),
        source,
    }
}

/// Object and container names are single path components
fn validate_key(key: &str) -> Result<(), PersistError> {
    let invalid = key.is_empty()
        || key == "."
        || key == ".."
        || key.contains('/')
        || key.contains('\\')
        || key.contains('\0');
    if invalid {
        return Err(PersistError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// =============================================================================
// In-memory store
// =============================================================================

/// Process-local store used by tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without counting it as a write
    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.into(), bytes.into());
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Number of successful `write` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn exists(&self, key: &str) -> Result<bool, PersistError> {
        Ok(self.get(key).is_some())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, PersistError> {
        self.get(key).ok_or_else(|| {
            io_error(
                key,
                std::io::Error::new(std::io::ErrorKind::NotFound, "object not found"),
            )
        })
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), PersistError> {
        self.insert(key, bytes);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
