use bcrp_core::catalog::{CatalogConfig, MetadataCatalog};
use bcrp_core::client::{BcrpClient, ClientConfig, ClientError};
use bcrp_core::control::BcrpControlPlane;
use tracing::{info, warn};

use crate::config::BcrpConfig;

pub fn build_control(config: &BcrpConfig) -> Result<BcrpControlPlane, ClientError> {
    let client_config = ClientConfig::default()
        .with_api_base_url(config.api_base_url.clone())
        .with_metadata_url(config.metadata_url.clone())
        .with_timeout(config.http_timeout)
        .with_metadata_timeout(config.metadata_timeout)
        .with_request_delay(config.request_delay);
    let client = BcrpClient::new(client_config)?;

    let mut catalog_config = CatalogConfig::from_client(client.clone())
        .with_policy(config.policy)
        .with_similarity(config.similarity);
    if let Some(path) = &config.cache_path {
        info!(path = %path.display(), "using metadata cache");
        catalog_config = catalog_config.with_cache_path(path.clone());
    } else {
        warn!("no cache directory available, metadata will be downloaded on every start");
    }

    Ok(BcrpControlPlane::new(
        MetadataCatalog::new(catalog_config),
        client,
    ))
}
