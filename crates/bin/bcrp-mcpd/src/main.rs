//! Daemon entry point for the BCRP MCP server.
//!
//! Loads configuration from CLI arguments and the environment, builds the
//! control plane, and serves the MCP protocol over stdio and/or streamable
//! HTTP.

mod config;
mod control;

use std::sync::Arc;

use bcrp_mcp::server::{
    McpHttpServerConfig, serve_stdio, serve_stdio_and_http, serve_streamable_http,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::BcrpConfig;
use crate::control::build_control;

const LOG_ENV: &str = "BCRP_LOG";

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    init_tracing();
    let config = BcrpConfig::from_args()?;
    info!(
        policy = %config.policy,
        similarity = config.similarity.as_str(),
        stdio = config.enable_stdio,
        http = config.mcp_serve,
        "starting bcrp-mcpd"
    );

    let control = Arc::new(build_control(&config)?);

    match (config.enable_stdio, config.mcp_serve) {
        (true, true) => {
            serve_stdio_and_http(control, McpHttpServerConfig::new(config.mcp_http_addr))
                .await?;
        }
        (false, true) => {
            serve_streamable_http(control, McpHttpServerConfig::new(config.mcp_http_addr))
                .await?;
        }
        _ => serve_stdio(control).await?,
    }
    Ok(())
}
