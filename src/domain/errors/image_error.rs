//! Image resolution error types.

use thiserror::Error;

/// Failures below the resolver boundary.
///
/// None of these reach the display layer: each is recovered where it
/// happens and at most logged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ImageError {
    #[error("could not decode reference segment `{segment}`: {reason}")]
    NormalizationAmbiguous { segment: String, reason: String },

    #[error("storage resolution failed for `{path}`: {message}")]
    StorageResolutionFailed { path: String, message: String },

    #[error("storage resolution timed out for `{path}` after {timeout_ms}ms")]
    Timeout { path: String, timeout_ms: u64 },

    #[error("persistent cache store unavailable: {message}")]
    PersistenceUnavailable { message: String },

    #[error("all {tried} image candidates exhausted")]
    AllCandidatesExhausted { tried: usize },
}

impl ImageError {
    /// Creates a storage resolution error.
    #[must_use]
    pub fn storage(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StorageResolutionFailed {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a persistence error.
    #[must_use]
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceUnavailable {
            message: message.into(),
        }
    }
}
