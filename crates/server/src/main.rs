//! DocGrid server.
//!
//! Serves the grid and editor protocols over a document store.

use clap::Parser;
use docgrid_engine::FieldCatalog;
use docgrid_engine::backends::memory::MemoryStore;
use docgrid_rest::{ServerConfig, StoreBackend, create_app_with_config, init_logging};
use tracing::{info, warn};

/// Starts the Axum HTTP server.
async fn serve(app: axum::Router, config: &ServerConfig) -> anyhow::Result<()> {
    let addr = config.socket_addr();
    info!(address = %addr, "Server listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    let catalog = config
        .load_catalog()
        .map_err(|e| anyhow::anyhow!("Invalid field catalog: {}", e))?;
    if catalog.is_empty() {
        warn!("No field catalog configured; every field is searched as untyped text");
    }

    info!(
        port = config.port,
        host = %config.host,
        store = %config.store_backend,
        fields = catalog.len(),
        "Starting DocGrid server"
    );

    match config.store_backend {
        StoreBackend::Memory => start_memory(config, catalog).await,
        StoreBackend::MongoDb => start_mongodb(config, catalog).await,
    }
}

/// Starts the server with the in-process store.
async fn start_memory(config: ServerConfig, catalog: FieldCatalog) -> anyhow::Result<()> {
    warn!("Using the in-memory store; data is lost on shutdown");
    let app = create_app_with_config(MemoryStore::new(), catalog, config.clone());
    serve(app, &config).await
}

/// Starts the server with the MongoDB store.
#[cfg(feature = "mongodb")]
async fn start_mongodb(config: ServerConfig, catalog: FieldCatalog) -> anyhow::Result<()> {
    use docgrid_engine::backends::mongodb::MongoStore;

    let url = config
        .mongodb_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DOCGRID_MONGODB_URL is required for the mongodb store"))?;
    info!(database = %config.mongodb_database, "Connecting to MongoDB");

    let store = MongoStore::connect(url, &config.mongodb_database).await?;
    let app = create_app_with_config(store, catalog, config.clone());
    serve(app, &config).await
}

/// Fallback when the mongodb feature is not enabled.
#[cfg(not(feature = "mongodb"))]
async fn start_mongodb(_config: ServerConfig, _catalog: FieldCatalog) -> anyhow::Result<()> {
    anyhow::bail!(
        "The mongodb store requires the 'mongodb' feature. \
         Build with: cargo build -p docgrid-server --features mongodb"
    )
}
