use serde::Serialize;
use tracing::{info, warn};

use crate::search::{
    Candidate, NotFoundReason, ResolutionPolicy, ResolutionResult, SimilarityMode,
};

use super::{BcrpControlPlane, ControlError};

/// Number of rows in the fallback listing of [`BcrpControlPlane::search_series`].
pub const FALLBACK_LISTING_LIMIT: usize = 20;
pub const MAX_LISTING_LIMIT: usize = 200;

/// Resolution outcome plus, when nothing resolved, a fuzzy listing to browse.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSearch {
    pub query: String,
    pub resolution: ResolutionResult,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Candidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub generation: u64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataStatus {
    pub loaded: bool,
    pub generation: u64,
    pub records: usize,
    pub policy: ResolutionPolicy,
    pub similarity: SimilarityMode,
}

impl BcrpControlPlane {
    /// Resolves `query`; when it does not resolve and is not empty, attaches
    /// the top fuzzy matches so the caller can pick one.
    ///
    /// # Errors
    /// Returns `ControlError::Catalog` if the metadata cannot be loaded.
    pub async fn search_series(&self, query: &str) -> Result<SeriesSearch, ControlError> {
        let engine = self.catalog.engine().await?;
        let resolution = engine.resolve(query);
        let suggestions = match &resolution {
            ResolutionResult::NotFound { reason } if *reason != NotFoundReason::EmptyQuery => {
                engine.search(query, FALLBACK_LISTING_LIMIT)
            }
            _ => Vec::new(),
        };
        info!(
            query,
            resolved = resolution.resolved_code(),
            suggestions = suggestions.len(),
            "series search"
        );
        Ok(SeriesSearch {
            query: query.to_string(),
            resolution,
            suggestions,
        })
    }

    /// Resolves `query` without any fallback listing.
    ///
    /// # Errors
    /// Returns `ControlError::Catalog` if the metadata cannot be loaded.
    pub async fn resolve_series(&self, query: &str) -> Result<ResolutionResult, ControlError> {
        Ok(self.catalog.engine().await?.resolve(query))
    }

    /// Fuzzy listing of up to `limit` series.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` for a zero or oversized limit and
    /// `ControlError::Catalog` if the metadata cannot be loaded.
    pub async fn list_series(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<Candidate>, ControlError> {
        if limit == 0 || limit > MAX_LISTING_LIMIT {
            return Err(ControlError::InvalidInput(format!(
                "limit must be between 1 and {MAX_LISTING_LIMIT}"
            )));
        }
        Ok(self.catalog.engine().await?.search(query, limit))
    }

    /// Re-downloads the catalog and installs a new snapshot.
    ///
    /// # Errors
    /// Returns `ControlError::Catalog` when the download fails.
    pub async fn refresh_metadata(&self) -> Result<RefreshReport, ControlError> {
        let corpus = self.catalog.refresh().await?;
        Ok(RefreshReport {
            generation: corpus.generation(),
            records: corpus.len(),
        })
    }

    /// Snapshot state without triggering a load.
    pub async fn metadata_status(&self) -> MetadataStatus {
        let current = self.catalog.current().await;
        let config = self.catalog.config();
        MetadataStatus {
            loaded: current.is_some(),
            generation: current.as_ref().map_or(0, |corpus| corpus.generation()),
            records: current.as_ref().map_or(0, |corpus| corpus.len()),
            policy: config.policy,
            similarity: config.similarity,
        }
    }

    /// Catalog display names for `codes`, or the codes themselves when the
    /// catalog is unavailable.
    pub async fn series_names(&self, codes: &[String]) -> Vec<String> {
        match self.catalog.snapshot().await {
            Ok(corpus) => corpus.display_names(codes),
            Err(err) => {
                warn!(error = %err, "metadata unavailable, using series codes as names");
                codes.to_vec()
            }
        }
    }
}
