//! Storage resolution port definition.

use async_trait::async_trait;

use crate::domain::errors::ImageError;

/// Port turning storage-internal paths into fetchable download URLs.
#[async_trait]
pub trait StorageResolverPort: Send + Sync {
    /// Resolves a storage path to a download URL.
    ///
    /// `Ok(None)` and `Err(_)` are treated the same by callers: the object
    /// is unavailable and the next candidate should be tried.
    async fn resolve_storage_path(&self, path: &str) -> Result<Option<String>, ImageError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock storage resolver backed by a fixed path → URL map.
    #[derive(Default)]
    pub struct MockStorageResolver {
        urls: HashMap<String, String>,
        delay: Option<Duration>,
        calls: AtomicUsize,
        requested: parking_lot::Mutex<Vec<String>>,
    }

    impl MockStorageResolver {
        /// Creates a resolver that fails every path.
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a known object.
        #[must_use]
        pub fn with_object(mut self, path: &str, url: &str) -> Self {
            self.urls.insert(path.to_string(), url.to_string());
            self
        }

        /// Delays every answer.
        #[must_use]
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        /// Number of resolution calls received.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        /// Paths requested so far, in order.
        pub fn requested(&self) -> Vec<String> {
            self.requested.lock().clone()
        }
    }

    #[async_trait]
    impl StorageResolverPort for MockStorageResolver {
        async fn resolve_storage_path(&self, path: &str) -> Result<Option<String>, ImageError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.requested.lock().push(path.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.urls.get(path) {
                Some(url) if url.is_empty() => Ok(None),
                Some(url) => Ok(Some(url.clone())),
                None => Err(ImageError::storage(path, "object not found")),
            }
        }
    }
}
