//! Persistent stores for the URL cache.

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::fs;
use tracing::{debug, trace};

use crate::domain::entities::CacheEntry;
use crate::domain::errors::ImageError;
use crate::domain::ports::CacheStorePort;
use crate::infrastructure::config::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER};

/// JSON file store: one `<storage_key>.json` file per key.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Creates a store in the default location (`<cache dir>/images`).
    #[must_use]
    pub fn default_location() -> Self {
        Self::new(dirs_cache_path())
    }

    /// Returns the file backing `storage_key`.
    #[must_use]
    pub fn path_for(&self, storage_key: &str) -> PathBuf {
        let name: String = storage_key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

#[async_trait]
impl CacheStorePort for JsonFileStore {
    async fn read_all(&self, storage_key: &str) -> Result<Vec<CacheEntry>, ImageError> {
        let path = self.path_for(storage_key);
        let content = match fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                trace!(path = %path.display(), "No persisted URL cache");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(ImageError::persistence(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        serde_json::from_str(&content)
            .map_err(|e| ImageError::persistence(format!("Failed to parse {}: {e}", path.display())))
    }

    async fn write_all(&self, storage_key: &str, entries: &[CacheEntry]) -> Result<(), ImageError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| ImageError::persistence(format!("Failed to create cache dir: {e}")))?;

        let path = self.path_for(storage_key);
        let content = serde_json::to_vec(entries)
            .map_err(|e| ImageError::persistence(format!("Failed to serialize cache: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &content)
            .await
            .map_err(|e| ImageError::persistence(format!("Failed to write cache file: {e}")))?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ImageError::persistence(format!("Failed to replace cache file: {e}")))?;

        trace!(path = %path.display(), entries = entries.len(), "Wrote URL cache file");
        Ok(())
    }

    async fn remove_all(&self, storage_key: &str) -> Result<(), ImageError> {
        let path = self.path_for(storage_key);
        match fs::remove_file(&path).await {
            Ok(()) => {
                debug!(path = %path.display(), "Removed URL cache file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ImageError::persistence(format!(
                "Failed to remove cache file: {e}"
            ))),
        }
    }
}

/// In-memory store for memory-only sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, Vec<CacheEntry>>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stored value for `storage_key`.
    #[must_use]
    pub fn get(&self, storage_key: &str) -> Option<Vec<CacheEntry>> {
        self.values.lock().get(storage_key).cloned()
    }

    /// Replaces the stored value for `storage_key`.
    pub fn set(&self, storage_key: &str, entries: Vec<CacheEntry>) {
        self.values.lock().insert(storage_key.to_string(), entries);
    }
}

#[async_trait]
impl CacheStorePort for MemoryStore {
    async fn read_all(&self, storage_key: &str) -> Result<Vec<CacheEntry>, ImageError> {
        Ok(self.get(storage_key).unwrap_or_default())
    }

    async fn write_all(&self, storage_key: &str, entries: &[CacheEntry]) -> Result<(), ImageError> {
        self.set(storage_key, entries.to_vec());
        Ok(())
    }

    async fn remove_all(&self, storage_key: &str) -> Result<(), ImageError> {
        self.values.lock().remove(storage_key);
        Ok(())
    }
}

/// Returns the default cache directory path.
fn dirs_cache_path() -> PathBuf {
    directories::ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME).map_or_else(
        || {
            std::env::temp_dir()
                .join(APP_NAME)
                .join("cache")
                .join("images")
        },
        |dirs| dirs.cache_dir().join("images"),
    )
}
