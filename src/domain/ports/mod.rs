mod cache_store_port;
mod clock_port;
mod fallback_tracer_port;
mod image_resolver_port;
mod storage_resolver_port;

pub use cache_store_port::CacheStorePort;
pub use clock_port::{Clock, SystemClock};
pub use fallback_tracer_port::{FallbackTracer, NoopFallbackTracer};
pub use image_resolver_port::ImageResolverPort;
pub use storage_resolver_port::StorageResolverPort;
