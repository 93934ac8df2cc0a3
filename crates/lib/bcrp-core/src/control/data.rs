use std::path::PathBuf;

use bcrp_store::SeriesTable;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::client::PeriodRange;
use crate::render::{ChartSpec, LabeledTable, render_line_chart, resolve_labels};

use super::{BcrpControlPlane, ControlError};

const NO_DATA_MESSAGE: &str = "No data found for the specified parameters.";

/// Records for a data fetch, with a message when nothing came back.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataReport {
    pub codes: Vec<String>,
    pub columns: Vec<String>,
    pub records: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DataReport {
    fn from_table(table: &SeriesTable, labeled: LabeledTable) -> Self {
        let message = table.is_empty().then(|| NO_DATA_MESSAGE.to_string());
        Self {
            codes: table.codes.clone(),
            columns: labeled.columns,
            records: labeled.records,
            message,
        }
    }
}

/// Input payload for rendering a chart.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChartRequest {
    pub series_codes: Vec<String>,
    pub period: Option<String>,
    pub title: Option<String>,
    pub names: Option<Vec<String>>,
    pub output_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartStatus {
    Success,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartReport {
    pub status: ChartStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart_path: Option<PathBuf>,
    pub series: Vec<String>,
    pub message: String,
}

impl BcrpControlPlane {
    /// Fetches raw observations for `codes` over a tool-style `period`.
    ///
    /// # Errors
    /// Returns `ControlError::Client` for invalid codes or periods and for
    /// upstream failures.
    pub async fn fetch_table(
        &self,
        codes: &[String],
        period: Option<&str>,
    ) -> Result<SeriesTable, ControlError> {
        let range = PeriodRange::parse(period)?;
        info!(codes = ?codes, ?range, "fetching series");
        Ok(self.client.fetch_series(codes, &range).await?)
    }

    /// Observations keyed by series code.
    ///
    /// # Errors
    /// See [`Self::fetch_table`].
    pub async fn get_data(
        &self,
        codes: &[String],
        period: Option<&str>,
    ) -> Result<DataReport, ControlError> {
        let table = self.fetch_table(codes, period).await?;
        let labeled = LabeledTable::new(&table, &table.codes);
        Ok(DataReport::from_table(&table, labeled))
    }

    /// Observations with columns renamed to `names`, falling back to catalog
    /// display names and then to the codes.
    ///
    /// # Errors
    /// See [`Self::fetch_table`].
    pub async fn get_table(
        &self,
        codes: &[String],
        names: Option<&[String]>,
        period: Option<&str>,
    ) -> Result<DataReport, ControlError> {
        let table = self.fetch_table(codes, period).await?;
        let labels = self.labels_for(&table.codes, names).await;
        let labeled = LabeledTable::new(&table, &labels);
        Ok(DataReport::from_table(&table, labeled))
    }

    /// Fetches the series and renders them as an SVG line chart.
    ///
    /// # Errors
    /// Returns `ControlError::InvalidInput` without codes, client errors from
    /// the fetch, and `ControlError::Render` when drawing fails.
    pub async fn plot_chart(&self, request: ChartRequest) -> Result<ChartReport, ControlError> {
        let ChartRequest {
            series_codes,
            period,
            title,
            names,
            output_path,
        } = request;
        if series_codes.iter().all(|code| code.trim().is_empty()) {
            return Err(ControlError::InvalidInput(
                "series_codes must contain at least one code".to_string(),
            ));
        }

        let table = self.fetch_table(&series_codes, period.as_deref()).await?;
        if table.is_empty() {
            return Ok(ChartReport {
                status: ChartStatus::NoData,
                chart_path: None,
                series: table.codes,
                message: "No data found to plot.".to_string(),
            });
        }

        let labels = self.labels_for(&table.codes, names.as_deref()).await;
        let mut spec = ChartSpec::for_codes(&table.codes).with_labels(labels);
        if let Some(title) = title.filter(|t| !t.trim().is_empty()) {
            spec = spec.with_title(title);
        }
        if let Some(path) = output_path {
            spec = spec.with_output(path);
        }

        let output = tokio::task::spawn_blocking(move || render_line_chart(&table, &spec)).await??;
        let message = format!("Chart saved to {}", output.path.display());
        Ok(ChartReport {
            status: ChartStatus::Success,
            chart_path: Some(output.path),
            series: output.series,
            message,
        })
    }

    async fn labels_for(&self, codes: &[String], custom: Option<&[String]>) -> Vec<String> {
        let complete = custom.is_some_and(|names| {
            names.len() >= codes.len() && names.iter().all(|name| !name.trim().is_empty())
        });
        let catalog_names = if complete {
            Vec::new()
        } else {
            self.series_names(codes).await
        };
        resolve_labels(codes, custom, &catalog_names)
    }
}
