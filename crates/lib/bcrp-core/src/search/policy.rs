//! Resolution policies: how ranked candidates become a single answer.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::attributes::Facets;
use super::corpus::SeriesRecord;
use super::filter::FacetKind;
use super::normalize::{Normalizer, TokenizedText};
use super::similarity::{Similarity, TokenSetRatio, TokenSortRatio};

const STRICT_THRESHOLD: f64 = 80.0;
const STRICT_TOP_TIER_MARGIN: f64 = 5.0;
const STRICT_MISSING_TOKEN_PENALTY: f64 = 5.0;

const INTERACTIVE_THRESHOLD: f64 = 65.0;
const INTERACTIVE_HIGH_TIER_MARGIN: f64 = 2.0;
const INTERACTIVE_CONFIDENT_SCORE: f64 = 85.0;
const INTERACTIVE_SIDE_BONUS: f64 = 5.0;
const INTERACTIVE_SIDE_PENALTY: f64 = 10.0;

const PERFECT_SCORE: f64 = 100.0;
const MAX_CANDIDATES: usize = 5;

/// Selects the filtering, scoring and decision rules used by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionPolicy {
    /// Token-sort scoring with a missing-term penalty; a near-tie is ambiguous
    /// only when the top tier mixes currencies or components.
    #[default]
    Strict,
    /// Token-set scoring with synonym expansion and a side bonus; anything
    /// short of a clear winner returns a candidate list.
    Interactive,
}

impl ResolutionPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Interactive => "interactive",
        }
    }

    #[must_use]
    pub const fn normalizer(self) -> Normalizer {
        match self {
            Self::Strict => Normalizer::plain(),
            Self::Interactive => Normalizer::with_synonyms(),
        }
    }

    #[must_use]
    pub const fn hard_filters(self) -> &'static [FacetKind] {
        match self {
            Self::Strict => &[FacetKind::Currency, FacetKind::Horizon, FacetKind::Component],
            Self::Interactive => &[FacetKind::Currency, FacetKind::Horizon],
        }
    }

    #[must_use]
    pub const fn threshold(self) -> f64 {
        match self {
            Self::Strict => STRICT_THRESHOLD,
            Self::Interactive => INTERACTIVE_THRESHOLD,
        }
    }

    /// The fuzzy matcher this policy was tuned against.
    #[must_use]
    pub fn native_similarity(self) -> Arc<dyn Similarity> {
        match self {
            Self::Strict => Arc::new(TokenSortRatio),
            Self::Interactive => Arc::new(TokenSetRatio),
        }
    }

    /// Applies the policy's bonuses and penalties to a base similarity score.
    #[must_use]
    pub fn adjust(
        self,
        base: f64,
        query: &TokenizedText,
        query_facets: &Facets,
        candidate: &SeriesRecord,
    ) -> f64 {
        match self {
            Self::Strict => {
                let missing = query
                    .tokens
                    .iter()
                    .filter(|token| !candidate.name.contains(token))
                    .count();
                let missing = f64::from(u32::try_from(missing).unwrap_or(u32::MAX));
                STRICT_MISSING_TOKEN_PENALTY.mul_add(-missing, base)
            }
            Self::Interactive => match (query_facets.side, candidate.facets.side) {
                (Some(wanted), Some(found)) if wanted == found => base + INTERACTIVE_SIDE_BONUS,
                (Some(_), Some(_)) => base - INTERACTIVE_SIDE_PENALTY,
                _ => base,
            },
        }
    }

    /// Turns candidates ranked by descending score into a resolution.
    #[must_use]
    pub fn decide(self, ranked: &[ScoredCandidate<'_>]) -> ResolutionResult {
        let Some(top) = ranked.first() else {
            return ResolutionResult::not_found(NotFoundReason::LowScore);
        };
        match self {
            Self::Strict => decide_strict(top, ranked),
            Self::Interactive => decide_interactive(top, ranked),
        }
    }
}

fn decide_strict(top: &ScoredCandidate<'_>, ranked: &[ScoredCandidate<'_>]) -> ResolutionResult {
    if ranked.len() == 1 {
        return ResolutionResult::resolved(top);
    }

    let floor = top.score - STRICT_TOP_TIER_MARGIN;
    let tier: Vec<&ScoredCandidate<'_>> = ranked.iter().filter(|c| c.score >= floor).collect();
    let currencies: HashSet<_> = tier.iter().map(|c| c.record.facets.currency).collect();
    let components: HashSet<_> = tier.iter().map(|c| c.record.facets.component).collect();

    if currencies.len() > 1 || components.len() > 1 {
        return ResolutionResult::Ambiguous {
            reason: AmbiguityReason::MixedAttributesInTopResults,
            candidates: tier
                .into_iter()
                .take(MAX_CANDIDATES)
                .map(Candidate::from)
                .collect(),
        };
    }

    ResolutionResult::resolved(top)
}

fn decide_interactive(
    top: &ScoredCandidate<'_>,
    ranked: &[ScoredCandidate<'_>],
) -> ResolutionResult {
    let floor = top.score - INTERACTIVE_HIGH_TIER_MARGIN;
    let high_tier = ranked.iter().filter(|c| c.score >= floor).count();
    if high_tier == 1 && top.score >= INTERACTIVE_CONFIDENT_SCORE {
        return ResolutionResult::resolved(top);
    }

    let mut perfect = ranked.iter().filter(|c| c.score >= PERFECT_SCORE);
    if let (Some(only), None) = (perfect.next(), perfect.next()) {
        return ResolutionResult::resolved(only);
    }

    let mut seen = HashSet::new();
    let candidates = ranked
        .iter()
        .filter(|c| seen.insert(c.record.code.as_str()))
        .take(MAX_CANDIDATES)
        .map(Candidate::from)
        .collect();
    ResolutionResult::Ambiguous {
        reason: AmbiguityReason::MultipleCandidates,
        candidates,
    }
}

impl fmt::Display for ResolutionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPolicy(pub String);

impl fmt::Display for UnknownPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown resolution policy: {} (expected strict or interactive)", self.0)
    }
}

impl std::error::Error for UnknownPolicy {}

impl FromStr for ResolutionPolicy {
    type Err = UnknownPolicy;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" | "deterministic" => Ok(Self::Strict),
            "interactive" | "candidates" => Ok(Self::Interactive),
            other => Err(UnknownPolicy(other.to_string())),
        }
    }
}

/// A candidate that cleared the acceptance threshold.
#[derive(Debug, Clone, Copy)]
pub struct ScoredCandidate<'a> {
    pub record: &'a SeriesRecord,
    pub score: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotFoundReason {
    EmptyCorpus,
    EmptyQuery,
    FiltersEliminatedAll,
    LowScore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityReason {
    MixedAttributesInTopResults,
    MultipleCandidates,
}

/// A series offered to the caller, with its score clamped to `[0, 100]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub code: String,
    pub name: String,
    pub score: f64,
}

impl From<&ScoredCandidate<'_>> for Candidate {
    fn from(candidate: &ScoredCandidate<'_>) -> Self {
        Self {
            code: candidate.record.code.clone(),
            name: candidate.record.name_original.clone(),
            score: round2(clamp_score(candidate.score)),
        }
    }
}

/// Outcome of resolving a free-text query against the corpus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResolutionResult {
    Resolved {
        code: String,
        name: String,
        confidence: f64,
        score: f64,
    },
    Ambiguous {
        reason: AmbiguityReason,
        candidates: Vec<Candidate>,
    },
    NotFound {
        reason: NotFoundReason,
    },
}

impl ResolutionResult {
    #[must_use]
    pub const fn not_found(reason: NotFoundReason) -> Self {
        Self::NotFound { reason }
    }

    fn resolved(candidate: &ScoredCandidate<'_>) -> Self {
        let score = clamp_score(candidate.score);
        Self::Resolved {
            code: candidate.record.code.clone(),
            name: candidate.record.name_original.clone(),
            confidence: round2(score / 100.0),
            score: round2(score),
        }
    }

    #[must_use]
    pub fn resolved_code(&self) -> Option<&str> {
        match self {
            Self::Resolved { code, .. } => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved { .. })
    }
}

fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, PERFECT_SCORE)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
