//! Domain layer with image entities, port definitions and pure services.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;
/// Reference classification and candidate building.
pub mod services;

pub use entities::{CacheEntry, EntityImages, ImageEntity, ImageReference, ResolutionOutcome};
pub use errors::ImageError;
pub use ports::{CacheStorePort, Clock, FallbackTracer, ImageResolverPort, StorageResolverPort};
