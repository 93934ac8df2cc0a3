//! Canonical text normalization shared by queries and catalog names.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Spanish function words that carry no signal for series matching.
pub const STOPWORDS: &[&str] = &[
    "de", "del", "el", "la", "los", "las", "y", "en", "al", "con", "por",
];

/// Abbreviations common in BCRP series names and how analysts spell them out.
///
/// No expansion may contain a key, otherwise normalization stops being
/// idempotent.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("tc", "tipo cambio"),
    ("pbi", "producto bruto interno"),
    ("ipc", "indice precios consumidor"),
    ("rin", "reservas internacionales netas"),
    ("tpm", "tasa politica monetaria"),
    ("tamn", "tasa activa moneda nacional"),
    ("tamex", "tasa activa moneda extranjera"),
    ("tipmn", "tasa pasiva moneda nacional"),
    ("tipmex", "tasa pasiva moneda extranjera"),
    ("mn", "moneda nacional"),
    ("me", "moneda extranjera"),
    ("bvl", "bolsa valores lima"),
];

#[must_use]
pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Text normalizer; optionally expands [`SYNONYMS`] before dropping stopwords.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Normalizer {
    synonyms: &'static [(&'static str, &'static str)],
}

impl Normalizer {
    #[must_use]
    pub const fn plain() -> Self {
        Self { synonyms: &[] }
    }

    #[must_use]
    pub const fn with_synonyms() -> Self {
        Self { synonyms: SYNONYMS }
    }

    #[must_use]
    pub const fn expands_synonyms(&self) -> bool {
        !self.synonyms.is_empty()
    }

    /// Folds to ASCII, lowercases, replaces punctuation with spaces, expands
    /// synonyms, drops stopwords and collapses whitespace.
    ///
    /// Lowercasing runs after the compatibility fold: letters such as `ℌ` or
    /// fullwidth capitals only become ASCII capitals once decomposed.
    #[must_use]
    pub fn normalize(&self, text: &str) -> String {
        let folded: String = text
            .nfkd()
            .filter(char::is_ascii)
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c.is_whitespace() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        let mut tokens: Vec<&str> = Vec::new();
        for token in folded.split_whitespace() {
            match self.expansion(token) {
                Some(expansion) => tokens.extend(expansion.split_whitespace()),
                None => tokens.push(token),
            }
        }
        tokens.retain(|token| !is_stopword(token));
        tokens.join(" ")
    }

    fn expansion(&self, token: &str) -> Option<&'static str> {
        self.synonyms
            .iter()
            .find(|(key, _)| *key == token)
            .map(|(_, expansion)| *expansion)
    }
}

/// A normalized string together with its token set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenizedText {
    pub text: String,
    pub tokens: BTreeSet<String>,
}

impl TokenizedText {
    /// Wraps text that has already been normalized.
    #[must_use]
    pub fn new(normalized: String) -> Self {
        let tokens = normalized.split_whitespace().map(str::to_string).collect();
        Self {
            text: normalized,
            tokens,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowercases_and_drops_stopwords() {
        let normalized = Normalizer::plain().normalize("Precio del COBRE");
        assert_eq!(normalized, "precio cobre");
    }

    #[test]
    fn folds_accents() {
        let normalized = Normalizer::plain().normalize("café Inflación Años");
        assert_eq!(normalized, "cafe inflacion anos");
        assert!(!normalized.contains('é'));
    }

    #[test]
    fn punctuation_becomes_separator() {
        let normalized = Normalizer::plain().normalize("Tipo de Cambio - (S/ por US$)");
        assert_eq!(normalized, "tipo cambio s us");
    }

    #[test]
    fn keeps_digits_and_underscores() {
        let normalized = Normalizer::plain().normalize("Índice 2009=100 base_a");
        assert_eq!(normalized, "indice 2009 100 base_a");
    }

    #[test]
    fn non_ascii_symbols_are_dropped() {
        assert_eq!(Normalizer::plain().normalize("€ 5"), "5");
        assert_eq!(Normalizer::plain().normalize(""), "");
        assert_eq!(Normalizer::plain().normalize("  \t "), "");
    }

    #[test]
    fn synonyms_expand_whole_tokens_only() {
        let normalizer = Normalizer::with_synonyms();
        assert_eq!(normalizer.normalize("TC compra"), "tipo cambio compra");
        assert_eq!(normalizer.normalize("tcx"), "tcx");
        assert_eq!(Normalizer::plain().normalize("tc"), "tc");
    }

    #[test]
    fn normalization_is_idempotent() {
        let samples = [
            "Tipo de Cambio Interbancario (S/ por US$) - Compra",
            "Reservas Internacionales Netas (millones US$)",
            "IPC de Lima Metropolitana, var% 12 meses",
            "tc en la BVL con el PBI",
            "ℌ ℝ ᴬ",
            "ＰＢＩ ｄｅ Ｌｉｍａ",
            "",
        ];
        for normalizer in [Normalizer::plain(), Normalizer::with_synonyms()] {
            for sample in samples {
                let once = normalizer.normalize(sample);
                assert_eq!(normalizer.normalize(&once), once, "sample: {sample}");
            }
        }
    }

    #[test]
    fn compatibility_capitals_fold_to_lowercase() {
        assert_eq!(Normalizer::plain().normalize("ℌ ℝ ᴬ"), "h r a");
        assert_eq!(
            Normalizer::with_synonyms().normalize("ＰＢＩ ｄｅ Ｌｉｍａ"),
            "producto bruto interno lima"
        );
    }

    #[test]
    fn output_never_contains_stopwords() {
        let normalizer = Normalizer::with_synonyms();
        for sample in ["De la tasa de interés y el crédito en soles", "del al con por los las"] {
            let normalized = normalizer.normalize(sample);
            for stopword in STOPWORDS {
                assert!(
                    !normalized.split_whitespace().any(|token| token == *stopword),
                    "{stopword} survived in {normalized}"
                );
            }
        }
    }

    #[test]
    fn synonym_expansions_contain_no_keys() {
        for (_, expansion) in SYNONYMS {
            for token in expansion.split_whitespace() {
                assert!(SYNONYMS.iter().all(|(key, _)| key != &token));
            }
        }
    }

    #[test]
    fn tokenized_text_collects_distinct_tokens() {
        let text = TokenizedText::new("tipo cambio tipo".to_string());
        assert_eq!(text.tokens.len(), 2);
        assert!(text.contains("cambio"));
        assert!(TokenizedText::default().is_empty());
    }
}
