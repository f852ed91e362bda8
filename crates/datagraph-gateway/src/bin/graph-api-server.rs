//! Graph API server
//!
//! Serves `/graph/linksList` and `/graph/nodesList` over a Neo4j store.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use datagraph_gateway::{
    adapters::Neo4jGraphStore, build_router, init_tracing, AppState, GatewayConfig, GraphService,
    GraphStore,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Tracing first, so warnings about invalid settings are not lost
    init_tracing(&GatewayConfig::log_filter());
    let config = GatewayConfig::load();

    info!("Connecting to Neo4j at: {}", config.neo4j.uri);
    let store: Arc<dyn GraphStore> = Arc::new(
        Neo4jGraphStore::connect(config.neo4j.clone())
            .await
            .context("Failed to connect to Neo4j")?,
    );

    let app = build_router(AppState {
        graph: GraphService::new(Arc::clone(&store)),
    });

    let addr = config.socket_addr().context("Invalid bind address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Starting server on {}", addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Release the driver whether or not the server exited cleanly
    if let Err(e) = store.shutdown().await {
        error!("Failed to shut down graph store: {}", e);
    }

    served.context("Server error")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
