use anyhow::Context;
use eventmesh_sync::catalog::client::HttpCatalogStore;
use eventmesh_sync::catalog::CatalogStore;
use eventmesh_sync::config::AppConfig;
use eventmesh_sync::provider::EventMeshProvider;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let catalog = config
        .catalog
        .context("no catalog endpoint configured")?;
    let store: Arc<dyn CatalogStore> =
        Arc::new(HttpCatalogStore::new(&catalog.base_url, catalog.token.clone())?);

    let providers = EventMeshProvider::from_configs(&config.providers, store, None)?;
    if providers.is_empty() {
        warn!("no event mesh providers configured, exiting");
        return Ok(());
    }

    info!(
        version = eventmesh_sync::version(),
        providers = providers.len(),
        "starting event mesh catalog sync"
    );

    let handles: Vec<_> = providers
        .into_iter()
        .map(|provider| Arc::new(provider).start())
        .collect();

    for handle in handles {
        handle.await?;
    }

    Ok(())
}
