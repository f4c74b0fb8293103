//! Key-value blob store backends

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;
use uuid::Uuid;

use crate::error::PersistenceError;

/// Async text blob store keyed by namespaced strings
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read a blob, `None` when the key has never been written
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// Replace a blob wholesale
    async fn put(&self, key: &str, value: String) -> Result<(), PersistenceError>;
}

/// One JSON file per key inside a data directory
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key.replace(':', "_")))
    }
}

#[async_trait]
impl BlobStore for FileBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    async fn put(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        let io_err = |source| PersistenceError::Io {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).await.map_err(io_err)?;

        // Write beside the target and rename so a reader never sees a torn file
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{}.tmp", Uuid::new_v4()));
        fs::write(&tmp, value).await.map_err(io_err)?;
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(io_err(e));
        }

        debug!("Wrote blob {} to {}", key, path.display());
        Ok(())
    }
}

/// In-process blob store with switchable failures
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw payload, bypassing serialization
    pub fn insert_raw(&self, key: &str, value: impl Into<String>) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(key.to_string(), value.into());
        }
    }

    /// Current raw payload for a key
    pub fn raw(&self, key: &str) -> Option<String> {
        self.blobs.lock().ok().and_then(|blobs| blobs.get(key).cloned())
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!("read of {} refused", key)));
        }
        self.blobs
            .lock()
            .map(|blobs| blobs.get(key).cloned())
            .map_err(|e| PersistenceError::Unavailable(format!("Failed to lock blob map: {}", e)))
    }

    async fn put(&self, key: &str, value: String) -> Result<(), PersistenceError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistenceError::Unavailable(format!("write of {} refused", key)));
        }
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|e| PersistenceError::Unavailable(format!("Failed to lock blob map: {}", e)))?;
        blobs.insert(key.to_string(), value);
        Ok(())
    }
}
