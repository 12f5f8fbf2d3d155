//! Domain entity definitions.

mod cache_entry;
mod image_entity;
mod image_reference;
mod resolution;

pub use cache_entry::CacheEntry;
pub use image_entity::{EntityImages, ImageEntity};
pub use image_reference::ImageReference;
pub use resolution::{ResolutionOutcome, ResolutionSource};
