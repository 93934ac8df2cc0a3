//! Hard facet filters applied before scoring.

use super::attributes::Facets;
use super::corpus::SeriesRecord;

/// A facet that can act as a hard filter. Side and scale only adjust scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetKind {
    Currency,
    Horizon,
    Component,
}

/// Returns true when `record` satisfies every non-null `query` facet listed in
/// `kinds`. A record with a null facet fails a non-null constraint.
#[must_use]
pub fn satisfies(record: &Facets, query: &Facets, kinds: &[FacetKind]) -> bool {
    kinds.iter().all(|kind| match kind {
        FacetKind::Currency => query.currency.is_none_or(|value| record.currency == Some(value)),
        FacetKind::Horizon => query.horizon.is_none_or(|value| record.horizon == Some(value)),
        FacetKind::Component => query
            .component
            .is_none_or(|value| record.component == Some(value)),
    })
}

/// Narrows `records` to those matching the query facets, preserving order.
#[must_use]
pub fn filter_candidates<'a>(
    records: &'a [SeriesRecord],
    query: &Facets,
    kinds: &[FacetKind],
) -> Vec<&'a SeriesRecord> {
    records
        .iter()
        .filter(|record| satisfies(&record.facets, query, kinds))
        .collect()
}
