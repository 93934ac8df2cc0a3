use bcrp_store::SeriesTable;
use serde::Serialize;
use serde_json::Value;

/// Column labels for each requested code.
///
/// A non-blank custom name wins, then the catalog display name, then the code.
#[must_use]
pub fn resolve_labels(
    codes: &[String],
    custom: Option<&[String]>,
    catalog_names: &[String],
) -> Vec<String> {
    codes
        .iter()
        .enumerate()
        .map(|(idx, code)| {
            let pick = |names: Option<&[String]>| {
                names
                    .and_then(|names| names.get(idx))
                    .map(|name| name.trim())
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
            };
            pick(custom)
                .or_else(|| pick(Some(catalog_names)))
                .unwrap_or_else(|| code.clone())
        })
        .collect()
}

/// A series table rendered as JSON records with human-readable columns.
///
/// `columns` lists the record keys after de-duplication, so it can differ
/// from the labels passed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledTable {
    pub columns: Vec<String>,
    pub records: Vec<Value>,
}

impl LabeledTable {
    #[must_use]
    pub fn new(table: &SeriesTable, labels: &[String]) -> Self {
        Self {
            columns: table.column_labels(Some(labels)),
            records: table.to_records(Some(labels)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrp_store::Observation;
    use serde_json::json;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| (*value).to_string()).collect()
    }

    #[test]
    fn labels_prefer_custom_then_catalog_then_code() {
        let codes = strings(&["A", "B", "C"]);
        let custom = strings(&["Cobre", " "]);
        let catalog = strings(&["Precio del Cobre", "Precio del Oro"]);
        let labels = resolve_labels(&codes, Some(&custom), &catalog);
        assert_eq!(labels, strings(&["Cobre", "Precio del Oro", "C"]));
        assert_eq!(resolve_labels(&codes, None, &[]), codes);
    }

    #[test]
    fn table_records_use_labels() {
        let table = SeriesTable {
            codes: strings(&["A"]),
            observations: vec![Observation {
                period: "Ene.2024".to_string(),
                values: vec![Some(1.5)],
            }],
        };
        let labeled = LabeledTable::new(&table, &strings(&["Cobre"]));
        assert_eq!(labeled.records, vec![json!({"time": "Ene.2024", "Cobre": 1.5})]);
    }

    #[test]
    fn duplicate_catalog_names_do_not_drop_series() {
        let table = SeriesTable {
            codes: strings(&["PN1", "PN2"]),
            observations: vec![Observation {
                period: "Ene.2024".to_string(),
                values: vec![Some(1.0), Some(2.0)],
            }],
        };
        let labels = resolve_labels(&table.codes, None, &strings(&["Precio", "Precio"]));
        let labeled = LabeledTable::new(&table, &labels);
        assert_eq!(labeled.columns, strings(&["Precio", "Precio (PN2)"]));
        assert_eq!(
            labeled.records,
            vec![json!({"time": "Ene.2024", "Precio": 1.0, "Precio (PN2)": 2.0})]
        );
    }
}
