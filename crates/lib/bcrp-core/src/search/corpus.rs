//! Preprocessed, immutable search index over the metadata catalog.

use std::collections::HashMap;

use bcrp_store::MetadataRow;
use tracing::debug;

use super::attributes::{Facets, extract_facets};
use super::normalize::{Normalizer, TokenizedText};

/// One catalog entry with its derived search fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRecord {
    pub code: String,
    pub name_original: String,
    pub name: TokenizedText,
    pub facets: Facets,
}

impl SeriesRecord {
    /// Derives the search fields for `row`; rows without a series code are
    /// not indexable and yield `None`.
    #[must_use]
    pub fn from_row(row: &MetadataRow, normalizer: &Normalizer) -> Option<Self> {
        let code = row.series_code()?.to_string();
        let name_original = row.display_name().to_string();
        let name = TokenizedText::new(normalizer.normalize(&name_original));
        let facets = extract_facets(&name.text);
        Some(Self {
            code,
            name_original,
            name,
            facets,
        })
    }
}

/// Ordered collection of [`SeriesRecord`]s built once per catalog load.
#[derive(Debug, Clone, Default)]
pub struct SearchCorpus {
    records: Vec<SeriesRecord>,
    by_code: HashMap<String, usize>,
    normalizer: Normalizer,
    generation: u64,
}

impl SearchCorpus {
    /// Builds a corpus snapshot from metadata rows in table order.
    ///
    /// When a code appears more than once, lookups by code resolve to its
    /// first occurrence.
    #[must_use]
    pub fn build(rows: &[MetadataRow], normalizer: Normalizer, generation: u64) -> Self {
        let mut records = Vec::with_capacity(rows.len());
        let mut by_code = HashMap::with_capacity(rows.len());
        let mut skipped = 0usize;
        for row in rows {
            let Some(record) = SeriesRecord::from_row(row, &normalizer) else {
                skipped += 1;
                continue;
            };
            by_code.entry(record.code.clone()).or_insert(records.len());
            records.push(record);
        }
        debug!(
            generation,
            records = records.len(),
            skipped,
            "built search corpus"
        );
        Self {
            records,
            by_code,
            normalizer,
            generation,
        }
    }

    #[must_use]
    pub fn records(&self) -> &[SeriesRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The normalizer the names were indexed with; queries must use the same.
    #[must_use]
    pub const fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<&SeriesRecord> {
        self.by_code
            .get(code.trim())
            .and_then(|idx| self.records.get(*idx))
    }

    /// Display names for `codes`, falling back to the code when unknown.
    #[must_use]
    pub fn display_names(&self, codes: &[String]) -> Vec<String> {
        codes
            .iter()
            .map(|code| {
                self.get(code)
                    .map(|record| record.name_original.trim())
                    .filter(|name| !name.is_empty())
                    .map_or_else(|| code.clone(), str::to_string)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::attributes::{Currency, Side};

    #[test]
    fn derives_fields_once_per_row() {
        let rows = vec![
            MetadataRow::new("PD04637PD", "Tipo de Cambio Interbancario Compra (S/ por US$)"),
            MetadataRow::default(),
            MetadataRow::new("PN01652XM", "Precio del Cobre"),
        ];
        let corpus = SearchCorpus::build(&rows, Normalizer::plain(), 7);

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.generation(), 7);
        let record = corpus.get("PD04637PD").expect("record indexed by code");
        assert_eq!(record.name.text, "tipo cambio interbancario compra s us");
        assert_eq!(record.facets.currency, Some(Currency::Usd));
        assert_eq!(record.facets.side, Some(Side::Compra));
    }

    #[test]
    fn display_names_fall_back_to_code() {
        let rows = vec![
            MetadataRow::new("PN01652XM", "Precio del Cobre"),
            MetadataRow::new("PN00000XM", "  "),
        ];
        let corpus = SearchCorpus::build(&rows, Normalizer::plain(), 1);
        let names = corpus.display_names(&[
            "PN01652XM".to_string(),
            "PN00000XM".to_string(),
            "UNKNOWN".to_string(),
        ]);
        assert_eq!(names, vec!["Precio del Cobre", "PN00000XM", "UNKNOWN"]);
    }

    #[test]
    fn synonym_normalizer_is_applied_to_names() {
        let rows = vec![MetadataRow::new("PN1", "PBI Minería")];
        let corpus = SearchCorpus::build(&rows, Normalizer::with_synonyms(), 1);
        assert!(corpus.normalizer().expands_synonyms());
        assert_eq!(corpus.records()[0].name.text, "producto bruto interno mineria");
    }
}
