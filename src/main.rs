use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use order_fulfillment::api;
use order_fulfillment::config::AppConfig;
use order_fulfillment::metrics::Metrics;
use order_fulfillment::service::FulfillmentService;
use order_fulfillment::store::{
    MemoryCatalog, MemoryStore, OrderStore, ProductCatalog, SqliteCatalog, SqliteStore,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured logging with environment-based filtering
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,order_fulfillment=debug")),
        )
        .init();

    tracing::info!("🚀 Starting order fulfillment service");

    let config = AppConfig::from_env()?;

    let metrics = Arc::new(Metrics::new()?);

    let (store, catalog): (Arc<dyn OrderStore>, Arc<dyn ProductCatalog>) =
        match &config.database_url {
            Some(url) => {
                let store = SqliteStore::connect(url).await?;
                let catalog = SqliteCatalog::new(store.pool().clone());
                (
                    Arc::new(store) as Arc<dyn OrderStore>,
                    Arc::new(catalog) as Arc<dyn ProductCatalog>,
                )
            }
            None => {
                let catalog = match &config.products_file {
                    Some(path) => {
                        let catalog = MemoryCatalog::from_json_file(path)?;
                        tracing::info!(path = %path.display(), "Loaded product catalog");
                        catalog
                    }
                    None => {
                        tracing::warn!(
                            "No DATABASE_URL or PRODUCTS_FILE set, catalog is empty; \
                             order placement will reject every product id"
                        );
                        MemoryCatalog::empty()
                    }
                };
                tracing::info!("Using in-memory order store");
                (
                    Arc::new(MemoryStore::new()) as Arc<dyn OrderStore>,
                    Arc::new(catalog) as Arc<dyn ProductCatalog>,
                )
            }
        };

    let service = Arc::new(FulfillmentService::new(store, catalog, metrics.clone()));

    api::run_server(service, metrics, &config.bind_addr, config.port).await?;

    Ok(())
}
