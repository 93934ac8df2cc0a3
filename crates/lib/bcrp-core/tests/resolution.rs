use std::sync::Arc;

use bcrp_core::search::{
    self, AmbiguityReason, NotFoundReason, ResolutionPolicy, ResolutionResult, SearchCorpus,
    SearchEngine, TokenOverlap,
};
use bcrp_store::MetadataRow;

const POLICIES: [ResolutionPolicy; 2] = [ResolutionPolicy::Strict, ResolutionPolicy::Interactive];

fn exchange_rate_rows() -> Vec<MetadataRow> {
    vec![
        MetadataRow::new("PD1", "Tipo de Cambio Compra USD"),
        MetadataRow::new("PD2", "Tipo de Cambio Venta USD"),
    ]
}

fn engine(rows: &[MetadataRow], policy: ResolutionPolicy) -> SearchEngine {
    let corpus = SearchCorpus::build(rows, policy.normalizer(), 1);
    SearchEngine::new(Arc::new(corpus), policy)
}

fn candidate_codes(result: &ResolutionResult) -> Vec<String> {
    match result {
        ResolutionResult::Ambiguous { candidates, .. } => {
            candidates.iter().map(|c| c.code.clone()).collect()
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn blank_queries_are_empty_under_every_policy() {
    for policy in POLICIES {
        let engine = engine(&exchange_rate_rows(), policy);
        for query in ["", "   ", "\t\n"] {
            assert_eq!(
                engine.resolve(query),
                ResolutionResult::not_found(NotFoundReason::EmptyQuery),
                "{policy} {query:?}"
            );
        }
    }
}

#[test]
fn buy_side_query_resolves_under_both_policies() {
    for policy in POLICIES {
        let result = engine(&exchange_rate_rows(), policy).resolve("tipo cambio compra");
        assert_eq!(result.resolved_code(), Some("PD1"), "{policy}: {result:?}");
    }
}

#[test]
fn strict_buy_side_confidence_reflects_extra_token() {
    match engine(&exchange_rate_rows(), ResolutionPolicy::Strict).resolve("Tipo de cambio compra") {
        ResolutionResult::Resolved {
            code, confidence, ..
        } => {
            assert_eq!(code, "PD1");
            assert!((confidence - 0.9).abs() < 1e-9);
        }
        other => panic!("expected resolution, got {other:?}"),
    }
}

#[test]
fn generic_exchange_rate_query_is_never_an_arbitrary_pick() {
    let interactive = engine(&exchange_rate_rows(), ResolutionPolicy::Interactive);
    let result = interactive.resolve("tipo cambio");
    assert!(matches!(
        result,
        ResolutionResult::Ambiguous {
            reason: AmbiguityReason::MultipleCandidates,
            ..
        }
    ));
    assert_eq!(candidate_codes(&result), vec!["PD1", "PD2"]);

    let strict = engine(&exchange_rate_rows(), ResolutionPolicy::Strict);
    assert!(!strict.resolve("tipo cambio").is_resolved());
    let listing: Vec<_> = strict
        .search("tipo cambio", 20)
        .into_iter()
        .map(|c| c.code)
        .collect();
    assert!(listing.contains(&"PD1".to_string()));
    assert!(listing.contains(&"PD2".to_string()));
}

#[test]
fn unknown_topic_is_not_found() {
    for policy in POLICIES {
        let result = engine(&exchange_rate_rows(), policy).resolve("inflación subyacente mensual");
        assert!(
            matches!(
                result,
                ResolutionResult::NotFound {
                    reason: NotFoundReason::LowScore | NotFoundReason::FiltersEliminatedAll
                }
            ),
            "{policy}: {result:?}"
        );
    }
}

#[test]
fn strict_mixed_currency_top_tier_is_ambiguous() {
    let rows = vec![
        MetadataRow::new("RIN_USD", "Reservas internacionales US$"),
        MetadataRow::new("RIN_PEN", "Reservas internacionales S/"),
    ];
    let result = engine(&rows, ResolutionPolicy::Strict).resolve("reservas internacionales");
    match &result {
        ResolutionResult::Ambiguous { reason, .. } => {
            assert_eq!(*reason, AmbiguityReason::MixedAttributesInTopResults);
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
    assert_eq!(candidate_codes(&result), vec!["RIN_PEN", "RIN_USD"]);

    let narrowed = engine(&rows, ResolutionPolicy::Strict).resolve("Reservas internacionales US$");
    assert_eq!(narrowed.resolved_code(), Some("RIN_USD"));
}

#[test]
fn currency_filter_can_eliminate_everything() {
    let rows = vec![MetadataRow::new("PN1", "Precio del Cobre US$")];
    for policy in POLICIES {
        assert_eq!(
            engine(&rows, policy).resolve("precio cobre soles"),
            ResolutionResult::not_found(NotFoundReason::FiltersEliminatedAll),
            "{policy}"
        );
    }
}

#[test]
fn interactive_expands_abbreviations() {
    let rows = vec![
        MetadataRow::new("PN02526AQ", "Producto Bruto Interno (var. %)"),
        MetadataRow::new("PN01652XM", "Precio del Cobre"),
    ];
    let result = engine(&rows, ResolutionPolicy::Interactive).resolve("PBI");
    assert_eq!(result.resolved_code(), Some("PN02526AQ"));
}

#[test]
fn resolved_confidence_tracks_score() {
    let rows = vec![
        MetadataRow::new("PD1", "Tipo de Cambio Compra USD"),
        MetadataRow::new("PD2", "Tipo de Cambio Venta USD"),
        MetadataRow::new("PN1", "Precio del Cobre"),
        MetadataRow::new("PN2", "Precio del Oro Londres"),
        MetadataRow::new("PN3", "Reservas internacionales netas millones US$"),
    ];
    let queries = [
        "tipo cambio compra",
        "tipo de cambio venta",
        "precio cobre",
        "oro londres",
        "reservas internacionales netas",
        "rin",
        "precio",
    ];
    for policy in POLICIES {
        let engine = engine(&rows, policy);
        for query in queries {
            if let ResolutionResult::Resolved {
                confidence, score, ..
            } = engine.resolve(query)
            {
                assert!((0.0..=1.0).contains(&confidence), "{policy} {query}");
                assert!((0.0..=100.0).contains(&score), "{policy} {query}");
                assert!((confidence - score / 100.0).abs() <= 0.006, "{policy} {query}");
            }
        }
    }
}

#[test]
fn overlap_fallback_still_resolves_exact_names() {
    let engine = engine(&exchange_rate_rows(), ResolutionPolicy::Strict)
        .with_similarity(Arc::new(TokenOverlap));
    assert_eq!(
        engine.resolve("tipo cambio compra usd").resolved_code(),
        Some("PD1")
    );
}

#[test]
fn resolution_is_deterministic() {
    for policy in POLICIES {
        let engine = engine(&exchange_rate_rows(), policy);
        let first = engine.resolve("tipo cambio");
        for _ in 0..5 {
            assert_eq!(engine.resolve("tipo cambio"), first);
        }
    }
}

#[test]
fn free_resolve_matches_engine_for_each_policy() {
    for policy in POLICIES {
        let corpus = Arc::new(SearchCorpus::build(
            &exchange_rate_rows(),
            policy.normalizer(),
            1,
        ));
        for query in ["tipo cambio venta", "tipo cambio", "", "cobre"] {
            assert_eq!(
                search::resolve(query, &corpus, policy),
                SearchEngine::new(Arc::clone(&corpus), policy).resolve(query),
                "{policy} {query:?}"
            );
        }
        assert_eq!(
            search::resolve("tipo cambio venta", &corpus, policy).resolved_code(),
            Some("PD2")
        );
    }
}
