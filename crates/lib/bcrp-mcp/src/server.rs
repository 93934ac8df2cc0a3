//! MCP server runners for bcrp-mcp.

use std::future::Future;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use bcrp_core::control::BcrpControlPlane;
use rmcp::serve_server;
use rmcp::transport::io::stdio;
use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig,
    StreamableHttpService,
    session::local::LocalSessionManager,
};
use tracing::{error, info};

use crate::BcrpMcp;

pub const DEFAULT_HTTP_PORT: u16 = 4020;

type ServeError = Box<dyn std::error::Error + Send + Sync>;

/// Configuration for the MCP streamable HTTP server.
#[derive(Debug, Clone)]
pub struct McpHttpServerConfig {
    pub addr: SocketAddr,
    pub stateful_mode: bool,
    pub sse_keep_alive: Option<Duration>,
    pub sse_retry: Option<Duration>,
}

impl McpHttpServerConfig {
    #[must_use]
    pub const fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stateful_mode: true,
            sse_keep_alive: Some(Duration::from_secs(15)),
            sse_retry: Some(Duration::from_secs(3)),
        }
    }

    #[must_use]
    pub const fn with_stateful_mode(mut self, stateful_mode: bool) -> Self {
        self.stateful_mode = stateful_mode;
        self
    }

    #[must_use]
    pub const fn with_sse_keep_alive(mut self, sse_keep_alive: Option<Duration>) -> Self {
        self.sse_keep_alive = sse_keep_alive;
        self
    }

    #[must_use]
    pub const fn with_sse_retry(mut self, sse_retry: Option<Duration>) -> Self {
        self.sse_retry = sse_retry;
        self
    }
}

impl Default for McpHttpServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_HTTP_PORT)))
    }
}

/// Serves the MCP server over stdio.
///
/// # Errors
/// Returns any transport or server error.
pub async fn serve_stdio(
    control: Arc<BcrpControlPlane>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let service = BcrpMcp::with_control(control);
    let (stdin, stdout) = stdio();
    info!("serving MCP over stdio");
    let running = serve_server(service, (stdin, stdout)).await?;
    let _ = running.waiting().await?;
    Ok(())
}

/// Builds the HTTP router: `/health` plus the MCP service nested at `/mcp`.
#[must_use]
pub fn build_router(control: Arc<BcrpControlPlane>, config: &McpHttpServerConfig) -> Router {
    let service: StreamableHttpService<BcrpMcp, LocalSessionManager> =
        StreamableHttpService::new(
            move || Ok(BcrpMcp::with_control(control.clone())),
            Arc::new(LocalSessionManager::default()),
            StreamableHttpServerConfig {
                sse_keep_alive: config.sse_keep_alive,
                sse_retry: config.sse_retry,
                stateful_mode: config.stateful_mode,
                ..Default::default()
            },
        );

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest_service("/mcp", service)
}

/// Serves the MCP server using streamable HTTP transport.
///
/// # Errors
/// Returns any listener or server error.
pub async fn serve_streamable_http(
    control: Arc<BcrpControlPlane>,
    config: McpHttpServerConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = build_router(control, &config);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!(addr = %config.addr, "serving MCP over streamable HTTP");
    axum::serve(listener, app).await?;
    Ok(())
}

/// Serves stdio and streamable HTTP side by side until either one stops.
///
/// # Errors
/// Returns the error of whichever transport stopped first.
pub async fn serve_stdio_and_http(
    control: Arc<BcrpControlPlane>,
    config: McpHttpServerConfig,
) -> Result<(), ServeError> {
    run_until_first(
        serve_stdio(control.clone()),
        serve_streamable_http(control, config),
    )
    .await
}

async fn run_until_first<S, H>(stdio: S, http: H) -> Result<(), ServeError>
where
    S: Future<Output = Result<(), ServeError>>,
    H: Future<Output = Result<(), ServeError>>,
{
    tokio::select! {
        result = stdio => {
            info!("stdio transport closed");
            result
        }
        result = http => {
            if let Err(err) = &result {
                error!(error = %err, "streamable HTTP server stopped");
            }
            result
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bcrp_core::catalog::{CatalogConfig, FetchMetadataFn, FetchMetadataFuture, MetadataCatalog};
    use bcrp_core::client::{BcrpClient, ClientConfig};

    fn control() -> Arc<BcrpControlPlane> {
        let fetch: FetchMetadataFn =
            Arc::new(|| -> FetchMetadataFuture { Box::pin(async { Ok(Vec::new()) }) });
        let catalog = MetadataCatalog::new(CatalogConfig::new(fetch));
        let client = BcrpClient::new(ClientConfig::default()).expect("client");
        Arc::new(BcrpControlPlane::new(catalog, client))
    }

    #[tokio::test]
    async fn http_bind_failure_stops_combined_serving() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let config = McpHttpServerConfig::new(occupied.local_addr().expect("local addr"));

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            run_until_first(
                std::future::pending::<Result<(), ServeError>>(),
                serve_streamable_http(control(), config),
            ),
        )
        .await
        .expect("combined serving should stop");

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn closed_stdio_ends_combined_serving() {
        let result = run_until_first(
            async { Ok::<(), ServeError>(()) },
            std::future::pending::<Result<(), ServeError>>(),
        )
        .await;
        assert!(result.is_ok());
    }

    #[test]
    fn default_config_binds_loopback() {
        let config = McpHttpServerConfig::default();
        assert_eq!(config.addr.to_string(), "127.0.0.1:4020");
        assert!(config.stateful_mode);
    }

    #[test]
    fn builders_override_defaults() {
        let config = McpHttpServerConfig::default()
            .with_stateful_mode(false)
            .with_sse_keep_alive(None)
            .with_sse_retry(Some(Duration::from_secs(1)));
        assert!(!config.stateful_mode);
        assert!(config.sse_keep_alive.is_none());
        assert_eq!(config.sse_retry, Some(Duration::from_secs(1)));
    }
}
