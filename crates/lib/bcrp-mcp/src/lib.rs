//! MCP server implementation for bcrp-mcp.
//!
//! This crate wires the BCRP control plane into rmcp tool handlers and exposes
//! the MCP-facing API surface for series lookup, data retrieval and charts.

mod helpers;
mod tools;
pub mod server;

use std::sync::Arc;

use bcrp_core::control::{BcrpControlPlane, MetadataStatus};
use rmcp::{
    ErrorData,
    ServerHandler,
    handler::server::router::prompt::PromptRouter,
    handler::server::tool::ToolRouter,
    prompt_handler,
    tool,
    tool_handler,
    tool_router,
};
use rmcp::model::{
    CallToolResult, Content, GetPromptRequestParams, GetPromptResult, ListPromptsResult,
    PaginatedRequestParams, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::RoleServer;
use serde::Serialize;

const SERVER_INSTRUCTIONS: &str = r"bcrp-mcp provides MCP tools for the statistics API of the Banco Central de Reserva del Perú (BCRP).

Workflow:
1. Find the series code for what you need:
   - `search_series` resolves a natural-language query (Spanish works best) to one series code.
     When nothing resolves it returns up to 20 fuzzy suggestions instead.
   - `resolve_series` returns only the resolution result: `resolved`, `ambiguous` or `not_found`.
   - `list_series` returns a ranked fuzzy listing with an explicit `limit`.
2. Fetch observations:
   - `get_data` returns records keyed by series code.
   - `get_table` renames columns with `names`, defaulting to the catalog series names.
3. Visualize:
   - `plot_chart` writes an SVG line chart and returns its path.

Notes:
- Series codes look like `PN01652XM`; the last letter is the frequency (D, M, Q, A).
- `period` accepts `YYYY`, `YYYY-MM/YYYY-MM`, or `YYYY-MM-DD/YYYY-MM-DD` for daily series.
- Missing values (`n.d.`) come back as null.
- Ambiguous queries are never resolved silently; pick one of the returned candidates.
- `refresh_metadata` re-downloads the series catalog.
- Use `help` for the command list. The `economista_peruano` prompt (also the `economist_brief` tool)
  frames an analysis as a senior BCRP economist.
- `health` reports metadata catalog state.";

/// Payload returned by the `health` tool.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub metadata: MetadataStatus,
}

/// MCP server wrapper around the control plane, tool routers and prompts.
#[derive(Clone)]
pub struct BcrpMcp {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    control: Arc<BcrpControlPlane>,
}

impl BcrpMcp {
    /// Creates a new server owning the control plane.
    #[must_use]
    pub fn new(control: BcrpControlPlane) -> Self {
        Self::with_control(Arc::new(control))
    }

    /// Creates a new server using a shared control plane handle.
    #[must_use]
    pub fn with_control(control: Arc<BcrpControlPlane>) -> Self {
        let tool_router = Self::tool_router_core()
            + Self::tool_router_search()
            + Self::tool_router_data()
            + Self::tool_router_context();
        Self {
            tool_router,
            prompt_router: Self::prompt_router_context(),
            control,
        }
    }

    pub(crate) fn control(&self) -> &BcrpControlPlane {
        &self.control
    }
}

#[tool_router(router = tool_router_core, vis = "pub")]
impl BcrpMcp {
    #[tool(description = "Health check. Returns 'ok' plus the metadata catalog state.")]
    async fn health(&self) -> Result<CallToolResult, ErrorData> {
        let report = HealthReport {
            status: "ok",
            metadata: self.control.metadata_status().await,
        };
        Ok(CallToolResult::success(vec![Content::json(report)?]))
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for BcrpMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(SERVER_INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }
}
