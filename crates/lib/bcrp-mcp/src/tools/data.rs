use std::path::PathBuf;

use bcrp_core::control::ChartRequest;
use rmcp::{
    ErrorData,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    schemars,
    tool,
    tool_router,
};
use serde::{Deserialize, Serialize};

use crate::{BcrpMcp, helpers};

/// Parameters for fetching raw observations.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetDataParams {
    pub series_codes: Vec<String>,
    /// `YYYY`, `YYYY-MM/YYYY-MM` or `YYYY-MM-DD/YYYY-MM-DD`.
    pub period: Option<String>,
}

/// Parameters for fetching observations with readable column names.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct GetTableParams {
    pub series_codes: Vec<String>,
    /// Column names in the same order as `series_codes`.
    pub names: Option<Vec<String>>,
    pub period: Option<String>,
}

/// Parameters for rendering a line chart.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct PlotChartParams {
    pub series_codes: Vec<String>,
    pub period: Option<String>,
    pub title: Option<String>,
    pub names: Option<Vec<String>>,
    /// Where to write the SVG; defaults to the system temp directory.
    pub output_path: Option<String>,
}

impl From<PlotChartParams> for ChartRequest {
    fn from(params: PlotChartParams) -> Self {
        Self {
            series_codes: params.series_codes,
            period: params.period,
            title: params.title,
            names: params.names,
            output_path: params
                .output_path
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

#[tool_router(router = tool_router_data, vis = "pub")]
impl BcrpMcp {
    #[tool(description = "Fetch observations for one or more series codes, keyed by code.")]
    async fn get_data(
        &self,
        Parameters(params): Parameters<GetDataParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = self
            .control()
            .get_data(&params.series_codes, params.period.as_deref())
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }

    #[tool(
        description = "Fetch observations as a table with named columns. Names default to the catalog series names."
    )]
    async fn get_table(
        &self,
        Parameters(params): Parameters<GetTableParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = self
            .control()
            .get_table(
                &params.series_codes,
                params.names.as_deref(),
                params.period.as_deref(),
            )
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }

    #[tool(description = "Render one or more series as an SVG line chart and return its path.")]
    async fn plot_chart(
        &self,
        Parameters(params): Parameters<PlotChartParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let report = self
            .control()
            .plot_chart(params.into())
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }
}
