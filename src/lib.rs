//! Trybe images - image reference resolution and URL caching.
//!
//! Turns the heterogeneous image references stored on events, users and
//! trybes (URLs, data URIs, storage paths, `gs://` URIs) into displayable
//! URLs, memoizing storage lookups in a bounded, persistent TTL cache.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing use cases and DTOs.
pub mod application;
/// Domain layer containing entities, errors, ports and pure services.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;
/// Presentation layer containing display-slot state.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "trybe-images";
