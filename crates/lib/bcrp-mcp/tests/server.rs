use std::sync::Arc;

use bcrp_core::catalog::{CatalogConfig, FetchMetadataFn, FetchMetadataFuture, MetadataCatalog};
use bcrp_core::client::{BcrpClient, ClientConfig};
use bcrp_core::control::BcrpControlPlane;
use bcrp_mcp::BcrpMcp;
use bcrp_mcp::server::{McpHttpServerConfig, build_router};
use rmcp::ServerHandler;

fn control() -> Arc<BcrpControlPlane> {
    let fetch: FetchMetadataFn =
        Arc::new(|| -> FetchMetadataFuture { Box::pin(async { Ok(Vec::new()) }) });
    let catalog = MetadataCatalog::new(CatalogConfig::new(fetch));
    let client = BcrpClient::new(ClientConfig::default()).expect("client");
    Arc::new(BcrpControlPlane::new(catalog, client))
}

async fn spawn_router() -> String {
    let app = build_router(control(), &McpHttpServerConfig::default());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn health_route_returns_ok() {
    let base = spawn_router().await;
    let response = reqwest::get(format!("{base}/health"))
        .await
        .expect("response");

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.text().await.expect("body"), "ok");
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let base = spawn_router().await;
    let response = reqwest::get(format!("{base}/series"))
        .await
        .expect("response");
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
}

#[test]
fn server_info_advertises_tools() {
    let info = BcrpMcp::with_control(control()).get_info();
    assert!(info.capabilities.tools.is_some());
    assert!(info.capabilities.prompts.is_some());
    let instructions = info.instructions.expect("instructions");
    for tool in [
        "search_series",
        "get_table",
        "plot_chart",
        "refresh_metadata",
        "economista_peruano",
    ] {
        assert!(instructions.contains(tool), "{tool}");
    }
}
