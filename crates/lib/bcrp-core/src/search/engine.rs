use std::sync::Arc;

use tracing::debug;

use super::attributes::extract_facets;
use super::corpus::SearchCorpus;
use super::filter::filter_candidates;
use super::normalize::TokenizedText;
use super::policy::{Candidate, NotFoundReason, ResolutionPolicy, ResolutionResult, ScoredCandidate};
use super::similarity::{Similarity, SimilarityKind, TokenOverlap, TokenSortRatio};

/// Minimum listing score for [`SearchEngine::search`].
pub const LISTING_CUTOFF: f64 = 40.0;

/// Resolves free-text queries against one corpus snapshot.
///
/// The engine holds no mutable state; cloning it is cheap and every clone
/// keeps answering from the snapshot it was built with.
#[derive(Debug, Clone)]
pub struct SearchEngine {
    corpus: Arc<SearchCorpus>,
    policy: ResolutionPolicy,
    similarity: Arc<dyn Similarity>,
}

impl SearchEngine {
    /// Builds an engine using the policy's native similarity.
    #[must_use]
    pub fn new(corpus: Arc<SearchCorpus>, policy: ResolutionPolicy) -> Self {
        Self {
            corpus,
            policy,
            similarity: policy.native_similarity(),
        }
    }

    /// Replaces the similarity strategy, e.g. with [`TokenOverlap`] when no
    /// fuzzy matcher should be used.
    #[must_use]
    pub fn with_similarity(mut self, similarity: Arc<dyn Similarity>) -> Self {
        self.similarity = similarity;
        self
    }

    #[must_use]
    pub const fn corpus(&self) -> &Arc<SearchCorpus> {
        &self.corpus
    }

    #[must_use]
    pub const fn policy(&self) -> ResolutionPolicy {
        self.policy
    }

    #[must_use]
    pub fn similarity_kind(&self) -> SimilarityKind {
        self.similarity.kind()
    }

    /// Resolves `query` to a single series, an ambiguity, or no match.
    #[must_use]
    pub fn resolve(&self, query: &str) -> ResolutionResult {
        if self.corpus.is_empty() {
            return ResolutionResult::not_found(NotFoundReason::EmptyCorpus);
        }

        let normalized = TokenizedText::new(self.corpus.normalizer().normalize(query));
        if normalized.is_empty() {
            return ResolutionResult::not_found(NotFoundReason::EmptyQuery);
        }

        let query_facets = extract_facets(&normalized.text);
        let candidates = filter_candidates(
            self.corpus.records(),
            &query_facets,
            self.policy.hard_filters(),
        );
        if candidates.is_empty() {
            debug!(query, ?query_facets, "facet filters eliminated every candidate");
            return ResolutionResult::not_found(NotFoundReason::FiltersEliminatedAll);
        }

        let threshold = self.policy.threshold();
        let mut ranked: Vec<ScoredCandidate<'_>> = candidates
            .into_iter()
            .filter_map(|record| {
                let base_score = self.similarity.score(&normalized, &record.name);
                let score = self
                    .policy
                    .adjust(base_score, &normalized, &query_facets, record);
                (score >= threshold).then_some(ScoredCandidate { record, score })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));

        let result = self.policy.decide(&ranked);
        debug!(
            query,
            policy = %self.policy,
            similarity = %self.similarity.kind(),
            accepted = ranked.len(),
            ?result,
            "resolved query"
        );
        result
    }

    /// Lists up to `limit` series by fuzzy similarity, best first.
    ///
    /// This is a lower-precision browse: no facet filters, no policy
    /// adjustments, and a fixed cutoff of [`LISTING_CUTOFF`]. It uses
    /// token-sort ratio unless the engine was configured with token overlap.
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<Candidate> {
        if limit == 0 || self.corpus.is_empty() {
            return Vec::new();
        }
        let normalized = TokenizedText::new(self.corpus.normalizer().normalize(query));
        if normalized.is_empty() {
            return Vec::new();
        }

        let listing: &dyn Similarity = if self.similarity.kind() == SimilarityKind::TokenOverlap {
            &TokenOverlap
        } else {
            &TokenSortRatio
        };

        let mut ranked: Vec<ScoredCandidate<'_>> = self
            .corpus
            .records()
            .iter()
            .filter_map(|record| {
                let score = listing.score(&normalized, &record.name);
                (score >= LISTING_CUTOFF).then_some(ScoredCandidate { record, score })
            })
            .collect();
        ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
        ranked.truncate(limit);
        ranked.iter().map(Candidate::from).collect()
    }
}
