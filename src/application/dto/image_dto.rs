//! Image resolution DTOs.

use serde::Serialize;

use crate::domain::entities::{ResolutionOutcome, ResolutionSource};

/// Result of resolving one entity's image slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    /// Entity id, if the record had one.
    pub entity_id: Option<String>,
    /// Candidates tried, most preferred first.
    pub candidates: Vec<String>,
    /// Resolution result.
    pub outcome: ResolutionOutcome,
}

impl ResolvedImage {
    /// Converts to a flat, serializable report.
    #[must_use]
    pub fn report(&self) -> ResolutionReport {
        ResolutionReport {
            entity_id: self.entity_id.clone(),
            candidates: self.candidates.clone(),
            source: self.outcome.source(),
            url: self.outcome.url().map(String::from),
        }
    }
}

/// Serializable summary of a resolution, printed by the CLI.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionReport {
    /// Entity id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    /// Candidates tried.
    pub candidates: Vec<String>,
    /// Where the URL came from.
    #[serde(serialize_with = "serialize_source")]
    pub source: ResolutionSource,
    /// Resolved URL, absent on failure.
    pub url: Option<String>,
}

fn serialize_source<S>(source: &ResolutionSource, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.collect_str(source)
}
