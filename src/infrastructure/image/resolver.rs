//! Candidate list resolution.
//!
//! Walks candidates in order: immediately usable references win outright,
//! then the URL cache, then the storage backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, trace};

use crate::domain::entities::ResolutionOutcome;
use crate::domain::errors::ImageError;
use crate::domain::ports::{ImageResolverPort, StorageResolverPort};
use crate::domain::services::ReferenceNormalizer;

use super::url_cache::UrlCache;

/// Default bound on a single storage lookup.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(8);

/// Configuration for the resolver.
#[derive(Debug, Clone)]
pub struct ImageResolverConfig {
    /// Upper bound for one storage lookup; expiry counts as a failure.
    pub timeout: Duration,
}

impl Default for ImageResolverConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

/// Resolves candidate lists through the URL cache and storage backend.
///
/// Concurrent resolutions of the same reference are not coalesced; both
/// write the same URL to the cache.
pub struct ImageResolver {
    cache: Arc<UrlCache>,
    storage: Arc<dyn StorageResolverPort>,
    config: ImageResolverConfig,
}

impl std::fmt::Debug for ImageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ImageResolver {
    /// Creates a resolver.
    #[must_use]
    pub fn new(
        cache: Arc<UrlCache>,
        storage: Arc<dyn StorageResolverPort>,
        config: ImageResolverConfig,
    ) -> Self {
        Self {
            cache,
            storage,
            config,
        }
    }

    /// Returns the underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &Arc<UrlCache> {
        &self.cache
    }

    /// Resolves one candidate list.
    pub async fn resolve(&self, candidates: &[String]) -> ResolutionOutcome {
        for candidate in candidates {
            if ReferenceNormalizer::is_immediate(candidate) {
                trace!(candidate = %candidate, "Candidate usable as-is");
                return ResolutionOutcome::Immediate(candidate.clone());
            }

            if let Some(url) = self.cache.get(candidate).await {
                return ResolutionOutcome::CacheHit(url);
            }

            match self.resolve_storage(candidate).await {
                Ok(url) => {
                    self.cache.put(candidate, &url).await;
                    debug!(candidate = %candidate, "Resolved image from storage");
                    return ResolutionOutcome::Resolved(url);
                }
                Err(e) => {
                    debug!(candidate = %candidate, error = %e, "Candidate failed, trying next");
                }
            }
        }

        let error = ImageError::AllCandidatesExhausted {
            tried: candidates.len(),
        };
        debug!(error = %error, "Falling back to placeholder");
        ResolutionOutcome::Failed
    }

    /// Resolves several candidate lists concurrently, keeping input order.
    pub async fn resolve_all(&self, lists: &[Vec<String>]) -> Vec<ResolutionOutcome> {
        join_all(lists.iter().map(|candidates| self.resolve(candidates))).await
    }

    async fn resolve_storage(&self, candidate: &str) -> Result<String, ImageError> {
        let reference = ReferenceNormalizer::normalize(candidate);
        let Some(path) = reference.storage_path().map(String::from) else {
            return Err(ImageError::storage(candidate, "not a storage reference"));
        };
        if path.is_empty() {
            return Err(ImageError::storage(candidate, "empty storage path"));
        }

        let result =
            tokio::time::timeout(self.config.timeout, self.storage.resolve_storage_path(&path))
                .await;
        match result {
            Ok(Ok(Some(url))) if !url.is_empty() => Ok(url),
            Ok(Ok(_)) => Err(ImageError::storage(path, "no download URL")),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ImageError::Timeout {
                path,
                timeout_ms: u64::try_from(self.config.timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        }
    }
}

#[async_trait]
impl ImageResolverPort for ImageResolver {
    async fn resolve(&self, candidates: &[String]) -> ResolutionOutcome {
        Self::resolve(self, candidates).await
    }
}
