//! String-similarity strategies used by the fuzzy scorer.
//!
//! All strategies return a score in `[0, 100]`. The fuzzy ratios are built on
//! `rapidfuzz::fuzz::ratio`, the normalized InDel similarity (insertions and
//! deletions only) of the two strings.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use rapidfuzz::fuzz;
use serde::{Deserialize, Serialize};

use super::normalize::TokenizedText;

/// Identifies a similarity strategy in logs and config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityKind {
    TokenSort,
    TokenSet,
    TokenOverlap,
}

impl fmt::Display for SimilarityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TokenSort => "token_sort",
            Self::TokenSet => "token_set",
            Self::TokenOverlap => "token_overlap",
        };
        f.write_str(name)
    }
}

/// Similarity between a normalized query and a normalized candidate name.
pub trait Similarity: Send + Sync + fmt::Debug {
    fn kind(&self) -> SimilarityKind;

    fn score(&self, query: &TokenizedText, candidate: &TokenizedText) -> f64;
}

/// Word-order-insensitive ratio over the sorted tokens of each string.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSortRatio;

impl Similarity for TokenSortRatio {
    fn kind(&self) -> SimilarityKind {
        SimilarityKind::TokenSort
    }

    fn score(&self, query: &TokenizedText, candidate: &TokenizedText) -> f64 {
        token_sort_ratio(&query.text, &candidate.text)
    }
}

/// Ratio that rewards a short query fully contained in a longer title.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenSetRatio;

impl Similarity for TokenSetRatio {
    fn kind(&self) -> SimilarityKind {
        SimilarityKind::TokenSet
    }

    fn score(&self, query: &TokenizedText, candidate: &TokenizedText) -> f64 {
        token_set_ratio(&query.tokens, &candidate.tokens)
    }
}

/// Fraction of query tokens present in the candidate, without edit tolerance.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenOverlap;

impl Similarity for TokenOverlap {
    fn kind(&self) -> SimilarityKind {
        SimilarityKind::TokenOverlap
    }

    fn score(&self, query: &TokenizedText, candidate: &TokenizedText) -> f64 {
        if query.tokens.is_empty() {
            return 0.0;
        }
        let shared = query.tokens.intersection(&candidate.tokens).count();
        ratio_of(shared, query.tokens.len()) * 100.0
    }
}

/// Configured choice of similarity backend.
///
/// `Fuzzy` uses the fuzzy ratio the resolution policy was tuned for;
/// `Overlap` forces plain token overlap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimilarityMode {
    #[default]
    Fuzzy,
    Overlap,
}

impl SimilarityMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Fuzzy => "fuzzy",
            Self::Overlap => "overlap",
        }
    }

    /// Returns the overlap strategy, or `None` when the policy default applies.
    #[must_use]
    pub fn override_strategy(self) -> Option<Arc<dyn Similarity>> {
        match self {
            Self::Fuzzy => None,
            Self::Overlap => Some(Arc::new(TokenOverlap)),
        }
    }
}

impl FromStr for SimilarityMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fuzzy" => Ok(Self::Fuzzy),
            "overlap" => Ok(Self::Overlap),
            other => Err(format!(
                "unknown similarity mode: {other} (expected fuzzy or overlap)"
            )),
        }
    }
}

/// Normalized InDel similarity of two strings in `[0, 100]`.
#[must_use]
pub fn ratio(left: &str, right: &str) -> f64 {
    if left.is_empty() && right.is_empty() {
        return 100.0;
    }
    fuzz::ratio(left.chars(), right.chars()) * 100.0
}

#[must_use]
pub fn token_sort_ratio(left: &str, right: &str) -> f64 {
    ratio(&sorted_tokens(left), &sorted_tokens(right))
}

#[must_use]
pub fn token_set_ratio(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = left.intersection(right).map(String::as_str).collect();
    let only_left: Vec<&str> = left.difference(right).map(String::as_str).collect();
    let only_right: Vec<&str> = right.difference(left).map(String::as_str).collect();

    if !shared.is_empty() && (only_left.is_empty() || only_right.is_empty()) {
        return 100.0;
    }

    let shared = shared.join(" ");
    let with_left = join_nonempty(&shared, &only_left.join(" "));
    let with_right = join_nonempty(&shared, &only_right.join(" "));

    let mut best = ratio(&with_left, &with_right);
    if !shared.is_empty() {
        best = best
            .max(ratio(&shared, &with_left))
            .max(ratio(&shared, &with_right));
    }
    best
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn join_nonempty(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (false, true) => head.to_string(),
        (false, false) => format!("{head} {tail}"),
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio_of(numerator: usize, denominator: usize) -> f64 {
    numerator as f64 / denominator as f64
}
