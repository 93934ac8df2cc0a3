//! Facet extraction from normalized text.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Currency {
    Usd,
    Pen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Horizon {
    Corto,
    Largo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Activos,
    Pasivos,
}

/// Quote side of an exchange-rate style series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Compra,
    Venta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Millones,
    Miles,
}

const USD_TOKENS: &[&str] = &["us", "usd", "dolares"];
const PEN_TOKENS: &[&str] = &["s", "pen", "soles"];
const BUY_TOKENS: &[&str] = &["compra"];
const SELL_TOKENS: &[&str] = &["venta"];

fn has_any_token(normalized: &str, candidates: &[&str]) -> bool {
    normalized
        .split_whitespace()
        .any(|token| candidates.iter().any(|candidate| *candidate == token))
}

/// Structured attributes inferred from text. `None` means unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Facets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon: Option<Horizon>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<Component>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<Scale>,
}

impl Facets {
    #[must_use]
    pub const fn is_unconstrained(&self) -> bool {
        self.currency.is_none()
            && self.horizon.is_none()
            && self.component.is_none()
            && self.side.is_none()
            && self.scale.is_none()
    }
}

/// Extracts every facet from already-normalized text.
///
/// Currency and side test whole tokens; horizon, component and scale test
/// substrings. Within each facet the first listed keyword wins.
#[must_use]
pub fn extract_facets(normalized: &str) -> Facets {
    let currency = if has_any_token(normalized, USD_TOKENS) {
        Some(Currency::Usd)
    } else if has_any_token(normalized, PEN_TOKENS) {
        Some(Currency::Pen)
    } else {
        None
    };

    let horizon = if normalized.contains("corto") {
        Some(Horizon::Corto)
    } else if normalized.contains("largo") {
        Some(Horizon::Largo)
    } else {
        None
    };

    let component = if normalized.contains("activos") {
        Some(Component::Activos)
    } else if normalized.contains("pasivos") {
        Some(Component::Pasivos)
    } else {
        None
    };

    let side = if has_any_token(normalized, BUY_TOKENS) {
        Some(Side::Compra)
    } else if has_any_token(normalized, SELL_TOKENS) {
        Some(Side::Venta)
    } else {
        None
    };

    let scale = if normalized.contains("millones") {
        Some(Scale::Millones)
    } else if normalized.contains("miles") {
        Some(Scale::Miles)
    } else {
        None
    };

    Facets {
        currency,
        horizon,
        component,
        side,
        scale,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_from_tokens() {
        assert_eq!(extract_facets("reservas usd").currency, Some(Currency::Usd));
        assert_eq!(extract_facets("credito soles").currency, Some(Currency::Pen));
        assert_eq!(extract_facets("tipo cambio s us").currency, Some(Currency::Usd));
        assert_eq!(extract_facets("usdx solesx").currency, None);
    }

    #[test]
    fn usd_takes_precedence_over_pen() {
        let facets = extract_facets("soles dolares");
        assert_eq!(facets.currency, Some(Currency::Usd));
    }

    #[test]
    fn substring_facets() {
        let facets = extract_facets("pasivos largo plazo millones");
        assert_eq!(facets.horizon, Some(Horizon::Largo));
        assert_eq!(facets.component, Some(Component::Pasivos));
        assert_eq!(facets.scale, Some(Scale::Millones));

        let facets = extract_facets("activos externos corto plazo miles");
        assert_eq!(facets.horizon, Some(Horizon::Corto));
        assert_eq!(facets.component, Some(Component::Activos));
        assert_eq!(facets.scale, Some(Scale::Miles));
    }

    #[test]
    fn side_requires_whole_token() {
        assert_eq!(extract_facets("tipo cambio venta").side, Some(Side::Venta));
        assert_eq!(extract_facets("compra venta").side, Some(Side::Compra));
        assert_eq!(extract_facets("compras netas").side, None);
    }

    #[test]
    fn extraction_is_total() {
        for text in ["", "   ", "nada relevante aqui", "s"] {
            let facets = extract_facets(text);
            assert_eq!(facets, extract_facets(text));
        }
        assert!(extract_facets("").is_unconstrained());
        assert!(!extract_facets("s").is_unconstrained());
    }
}
