//! Port for resolving candidate lists.

use async_trait::async_trait;

use crate::domain::entities::ResolutionOutcome;

/// Port resolving an ordered candidate list to a displayable URL.
///
/// Implementations never fail: every error is folded into
/// `ResolutionOutcome::Failed`.
#[async_trait]
pub trait ImageResolverPort: Send + Sync {
    /// Resolves `candidates`, most preferred first.
    async fn resolve(&self, candidates: &[String]) -> ResolutionOutcome;
}
