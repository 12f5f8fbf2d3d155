//! Infrastructure layer with storage, cache and configuration adapters.

/// Application configuration.
pub mod config;
/// Fallback diagnostics.
pub mod diagnostics;
/// Image URL caching and resolution.
pub mod image;

pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use diagnostics::TracingFallbackTracer;
pub use image::{
    CacheStats, FirebaseStorageResolver, ImageResolver, ImageResolverConfig, JsonFileStore,
    MemoryStore, UrlCache, UrlCacheConfig,
};
