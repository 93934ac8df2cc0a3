use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::TIME_COLUMN;

/// One row of the upstream metadata catalog.
///
/// Field names follow the Spanish headers of the published CSV so the cache file
/// stays readable by other tools. The code column is accepted under the
/// spellings produced by the different decodings of that header.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MetadataRow {
    #[serde(
        rename = "Código de serie",
        alias = "CÃ³digo de serie",
        alias = "Codigo de serie",
        default
    )]
    pub code: Option<String>,
    #[serde(rename = "Nombre de serie", default)]
    pub name: Option<String>,
    #[serde(
        rename = "Categoría de serie",
        alias = "CategorÃ\u{ad}a de serie",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
    #[serde(rename = "Grupo de serie", default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(rename = "Fuente", default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "Frecuencia", default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<String>,
    #[serde(rename = "Inicio", default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
    #[serde(rename = "Fin", default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
    #[serde(
        rename = "Fecha de actualización",
        alias = "Fecha de actualizaciÃ³n",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<String>,
}

impl MetadataRow {
    #[must_use]
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Trimmed series code, if the row carries a non-empty one.
    #[must_use]
    pub fn series_code(&self) -> Option<&str> {
        self.code
            .as_deref()
            .map(str::trim)
            .filter(|code| !code.is_empty())
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

/// Sampling frequency of a series, inferred from the code suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// BCRP codes end in `D`, `M`, `Q` or `A`; anything unrecognised is
    /// treated as monthly, the most common case.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim().chars().last().map(|c| c.to_ascii_uppercase()) {
            Some('D') => Self::Daily,
            Some('Q') => Self::Quarterly,
            Some('A') => Self::Annual,
            _ => Self::Monthly,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        }
    }
}

/// A single period row returned by the statistics API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Observation {
    pub period: String,
    pub values: Vec<Option<f64>>,
}

/// Observations for one or more series, aligned by period.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SeriesTable {
    pub codes: Vec<String>,
    pub observations: Vec<Observation>,
}

impl SeriesTable {
    #[must_use]
    pub const fn empty(codes: Vec<String>) -> Self {
        Self {
            codes,
            observations: Vec::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Column label for value index `idx`; extra values beyond the requested
    /// codes get a positional name.
    #[must_use]
    pub fn column_name(&self, idx: usize) -> String {
        self.codes
            .get(idx)
            .cloned()
            .unwrap_or_else(|| format!("series_{idx}"))
    }

    /// Values of one column in period order.
    #[must_use]
    pub fn column(&self, idx: usize) -> Vec<Option<f64>> {
        self.observations
            .iter()
            .map(|obs| obs.values.get(idx).copied().flatten())
            .collect()
    }

    /// Number of value columns, counting values past the requested codes.
    #[must_use]
    pub fn width(&self) -> usize {
        self.observations
            .iter()
            .map(|obs| obs.values.len())
            .max()
            .unwrap_or(0)
            .max(self.codes.len())
    }

    /// Distinct column labels for every value column.
    ///
    /// `labels` overrides names positionally; blank or missing labels fall back
    /// to the series code. A label that repeats an earlier one, or the time
    /// column, gets the code appended as ` (CODE)`.
    #[must_use]
    pub fn column_labels(&self, labels: Option<&[String]>) -> Vec<String> {
        let mut taken: HashSet<String> = HashSet::from([TIME_COLUMN.to_string()]);
        (0..self.width())
            .map(|idx| {
                let code = self.column_name(idx);
                let base = labels
                    .and_then(|labels| labels.get(idx))
                    .map(|label| label.trim())
                    .filter(|label| !label.is_empty())
                    .map_or_else(|| code.clone(), str::to_string);
                let mut label = base.clone();
                let mut attempt = 1;
                while taken.contains(&label) {
                    label = if attempt == 1 {
                        format!("{base} ({code})")
                    } else {
                        format!("{base} ({code}) {attempt}")
                    };
                    attempt += 1;
                }
                taken.insert(label.clone());
                label
            })
            .collect()
    }

    /// Renders the table as JSON records `{time, <column>: value}` keyed by
    /// [`Self::column_labels`].
    #[must_use]
    pub fn to_records(&self, labels: Option<&[String]>) -> Vec<Value> {
        let columns = self.column_labels(labels);
        self.observations
            .iter()
            .map(|obs| {
                let mut record = Map::new();
                record.insert(TIME_COLUMN.to_string(), Value::String(obs.period.clone()));
                for (key, value) in columns.iter().zip(&obs.values) {
                    let value = value
                        .and_then(serde_json::Number::from_f64)
                        .map_or(Value::Null, Value::Number);
                    record.insert(key.clone(), value);
                }
                Value::Object(record)
            })
            .collect()
    }
}
