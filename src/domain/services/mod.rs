//! Pure domain services.

mod candidate_builder;
mod reference_normalizer;

pub use candidate_builder::CandidateBuilder;
pub use reference_normalizer::ReferenceNormalizer;
