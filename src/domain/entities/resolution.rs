//! Outcome of resolving a candidate list.

use std::fmt;

/// Result of walking a candidate list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// Candidate was already displayable; no I/O happened.
    Immediate(String),
    /// Served from a non-expired cache entry.
    CacheHit(String),
    /// Resolved through the storage backend and cached.
    Resolved(String),
    /// Every candidate failed; the caller shows the static fallback.
    Failed,
}

impl ResolutionOutcome {
    /// Returns the displayable URL, if any.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Immediate(url) | Self::CacheHit(url) | Self::Resolved(url) => Some(url),
            Self::Failed => None,
        }
    }

    /// Consumes the outcome, returning the URL.
    #[must_use]
    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Immediate(url) | Self::CacheHit(url) | Self::Resolved(url) => Some(url),
            Self::Failed => None,
        }
    }

    /// Returns true if no candidate produced a URL.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns where the URL came from.
    #[must_use]
    pub const fn source(&self) -> ResolutionSource {
        match self {
            Self::Immediate(_) => ResolutionSource::Immediate,
            Self::CacheHit(_) => ResolutionSource::Cache,
            Self::Resolved(_) => ResolutionSource::Storage,
            Self::Failed => ResolutionSource::None,
        }
    }
}

/// Where a resolved URL was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// No lookup was needed.
    Immediate,
    /// URL cache.
    Cache,
    /// Storage backend.
    Storage,
    /// Nothing resolved.
    None,
}

impl fmt::Display for ResolutionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Immediate => write!(f, "immediate"),
            Self::Cache => write!(f, "cache"),
            Self::Storage => write!(f, "storage"),
            Self::None => write!(f, "none"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_url_and_source() {
        let hit = ResolutionOutcome::CacheHit("https://x".into());
        assert_eq!(hit.url(), Some("https://x"));
        assert_eq!(hit.source(), ResolutionSource::Cache);
        assert!(!hit.is_failed());

        let failed = ResolutionOutcome::Failed;
        assert_eq!(failed.url(), None);
        assert_eq!(failed.source().to_string(), "none");
        assert!(failed.into_url().is_none());
    }
}
