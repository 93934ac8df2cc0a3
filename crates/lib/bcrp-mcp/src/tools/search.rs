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

const DEFAULT_LIST_LIMIT: usize = 20;

/// Parameters for resolving a natural-language query to a series code.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct SeriesQueryParams {
    /// Free-text description, e.g. "tipo de cambio compra".
    pub query: String,
}

/// Parameters for a ranked fuzzy listing.
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema)]
pub struct ListSeriesParams {
    pub query: String,
    pub limit: Option<usize>,
}

#[tool_router(router = tool_router_search, vis = "pub")]
impl BcrpMcp {
    #[tool(
        description = "Resolve a query to a single BCRP series code. Falls back to fuzzy suggestions when nothing resolves."
    )]
    async fn search_series(
        &self,
        Parameters(params): Parameters<SeriesQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let search = self
            .control()
            .search_series(&params.query)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(search)?]))
    }

    #[tool(description = "Resolve a query and return only the resolution result.")]
    async fn resolve_series(
        &self,
        Parameters(params): Parameters<SeriesQueryParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let resolution = self
            .control()
            .resolve_series(&params.query)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(resolution)?]))
    }

    #[tool(description = "List series ranked by fuzzy similarity to a query.")]
    async fn list_series(
        &self,
        Parameters(params): Parameters<ListSeriesParams>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);
        let listing = self
            .control()
            .list_series(&params.query, limit)
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(listing)?]))
    }

    #[tool(description = "Re-download the BCRP metadata catalog and rebuild the search index.")]
    async fn refresh_metadata(&self) -> Result<CallToolResult, ErrorData> {
        let report = self
            .control()
            .refresh_metadata()
            .await
            .map_err(helpers::map_err)?;
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }
}
