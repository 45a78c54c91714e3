//! Cache store implementations.

use crate::key::{canonicalize, CacheKey};
use async_trait::async_trait;
use infercache_core::{CacheError, ResponseBody};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// Key-value store holding successful response bodies.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Load the entry for `key`, if present.
    async fn get(&self, key: &CacheKey) -> Result<Option<ResponseBody>, CacheError>;

    /// Store `body` under `key`, replacing any previous entry.
    async fn put(&self, key: &CacheKey, body: &ResponseBody) -> Result<(), CacheError>;

    /// Check whether an entry exists.
    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError>;

    /// Store name for logging.
    fn name(&self) -> &'static str;
}

/// Directory of `<key>.json` files.
///
/// Entries are written to a temporary file in the same directory and
/// renamed into place, so a reader sees either the old entry or the
/// complete new one.
#[derive(Debug, Clone)]
pub struct DiskCache {
    directory: PathBuf,
}

impl DiskCache {
    /// Open a cache directory, creating it and its parents if absent.
    pub fn new(directory: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let directory = directory.into();
        std::fs::create_dir_all(&directory)?;
        Ok(Self { directory })
    }

    /// The cache directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the entry stored under `key`.
    pub fn path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory.join(key.file_name())
    }

    fn temp_path_for(&self, key: &CacheKey) -> PathBuf {
        self.directory
            .join(format!(".{}.{}.tmp", key, uuid::Uuid::new_v4().simple()))
    }
}

#[async_trait]
impl CacheStore for DiskCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ResponseBody>, CacheError> {
        let content = match tokio::fs::read(self.path_for(key)).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&content)?))
    }

    async fn put(&self, key: &CacheKey, body: &ResponseBody) -> Result<(), CacheError> {
        let content = serde_json::to_vec_pretty(&canonicalize(&Value::Object(body.clone())))?;
        let temp = self.temp_path_for(key);
        let path = self.path_for(key);

        tokio::fs::write(&temp, content).await?;
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            tokio::fs::remove_file(&temp).await.ok();
            return Err(e.into());
        }

        debug!(path = %path.display(), "Wrote cache entry");
        Ok(())
    }

    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(tokio::fs::try_exists(self.path_for(key)).await?)
    }

    fn name(&self) -> &'static str {
        "disk"
    }
}

/// In-process store, mainly for tests and short-lived tools.
#[derive(Debug, Clone, Default)]
pub struct MemoryCache {
    entries: Arc<RwLock<HashMap<CacheKey, ResponseBody>>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<ResponseBody>, CacheError> {
        Ok(self.entries.read().get(key).cloned())
    }

    async fn put(&self, key: &CacheKey, body: &ResponseBody) -> Result<(), CacheError> {
        self.entries.write().insert(key.clone(), body.clone());
        Ok(())
    }

    async fn contains(&self, key: &CacheKey) -> Result<bool, CacheError> {
        Ok(self.entries.read().contains_key(key))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
