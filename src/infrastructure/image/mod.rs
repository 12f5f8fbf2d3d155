//! Image URL resolution infrastructure.
//!
//! This module provides:
//! - A persistent TTL cache of resolved URLs
//! - JSON file and in-memory stores backing that cache
//! - Firebase Storage download-URL resolution
//! - The candidate-list resolver tying them together

pub mod file_store;
pub mod firebase_storage;
pub mod resolver;
pub mod url_cache;

pub use file_store::{JsonFileStore, MemoryStore};
pub use firebase_storage::{DEFAULT_API_BASE, FirebaseStorageResolver};
pub use resolver::{DEFAULT_RESOLVE_TIMEOUT, ImageResolver, ImageResolverConfig};
pub use url_cache::{
    CacheStats, DEFAULT_MAX_ENTRIES, DEFAULT_TTL, STORAGE_KEY, UrlCache, UrlCacheConfig,
};
