//! Durable key-value store port for the URL cache.

use async_trait::async_trait;

use crate::domain::entities::CacheEntry;
use crate::domain::errors::ImageError;

/// Port for persisting the URL cache.
///
/// The whole cache is stored as one value under `storage_key`, in
/// insertion order.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheStorePort: Send + Sync {
    /// Reads every stored entry. A missing value yields an empty list.
    async fn read_all(&self, storage_key: &str) -> Result<Vec<CacheEntry>, ImageError>;

    /// Replaces the stored value with `entries`.
    async fn write_all(&self, storage_key: &str, entries: &[CacheEntry]) -> Result<(), ImageError>;

    /// Removes the stored value.
    async fn remove_all(&self, storage_key: &str) -> Result<(), ImageError>;
}
