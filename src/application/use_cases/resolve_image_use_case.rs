//! Entity image resolution use case.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::debug;

use crate::application::dto::ResolvedImage;
use crate::domain::entities::ImageEntity;
use crate::domain::ports::ImageResolverPort;
use crate::domain::services::CandidateBuilder;

/// Resolves the display image of an entity.
pub struct ResolveImageUseCase {
    resolver: Arc<dyn ImageResolverPort>,
    overrides_by_id: HashMap<String, String>,
}

impl ResolveImageUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(resolver: Arc<dyn ImageResolverPort>) -> Self {
        Self {
            resolver,
            overrides_by_id: HashMap::new(),
        }
    }

    /// Sets per-entity image overrides, keyed by entity id.
    #[must_use]
    pub fn with_overrides(mut self, overrides_by_id: HashMap<String, String>) -> Self {
        self.overrides_by_id = overrides_by_id;
        self
    }

    /// Builds candidates for `entity` and resolves them.
    pub async fn execute<E>(&self, entity: &E) -> ResolvedImage
    where
        E: ImageEntity + Sync + ?Sized,
    {
        let overrides = (!self.overrides_by_id.is_empty()).then_some(&self.overrides_by_id);
        let candidates = CandidateBuilder::build(entity, overrides);
        debug!(
            entity_id = ?entity.id(),
            candidates = candidates.len(),
            "Resolving entity image"
        );

        let outcome = self.resolver.resolve(&candidates).await;

        ResolvedImage {
            entity_id: entity.id().map(String::from),
            candidates,
            outcome,
        }
    }

    /// Resolves several entities concurrently, keeping input order.
    pub async fn execute_many<E>(&self, entities: &[E]) -> Vec<ResolvedImage>
    where
        E: ImageEntity + Sync,
    {
        join_all(entities.iter().map(|entity| self.execute(entity))).await
    }
}
