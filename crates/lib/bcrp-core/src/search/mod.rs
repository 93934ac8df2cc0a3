//! Deterministic resolution of free-text queries to BCRP series codes.
//!
//! The pipeline is normalize, extract facets, hard-filter, score, decide.
//! Corpus records are preprocessed once by [`SearchCorpus::build`]; a
//! [`SearchEngine`] pairs a corpus snapshot with a [`ResolutionPolicy`] and a
//! [`Similarity`] strategy.

pub mod attributes;
pub mod corpus;
pub mod engine;
pub mod filter;
pub mod normalize;
pub mod policy;
pub mod similarity;

use std::sync::Arc;

pub use attributes::{Component, Currency, Facets, Horizon, Scale, Side, extract_facets};
pub use corpus::{SearchCorpus, SeriesRecord};
pub use engine::{LISTING_CUTOFF, SearchEngine};
pub use filter::{FacetKind, filter_candidates};
pub use normalize::{Normalizer, TokenizedText};
pub use policy::{
    AmbiguityReason, Candidate, NotFoundReason, ResolutionPolicy, ResolutionResult,
    UnknownPolicy,
};
pub use similarity::{
    Similarity, SimilarityKind, SimilarityMode, TokenOverlap, TokenSetRatio, TokenSortRatio,
};

/// Resolves `query` against `corpus` with the policy's native similarity.
#[must_use]
pub fn resolve(
    query: &str,
    corpus: &Arc<SearchCorpus>,
    policy: ResolutionPolicy,
) -> ResolutionResult {
    SearchEngine::new(Arc::clone(corpus), policy).resolve(query)
}
