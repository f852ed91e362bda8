//! API routes and handlers for the graph gateway.

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod response;

use crate::{
    data::{
        entities::{GraphNodeView, LinkList},
        trace_context::TraceContext,
    },
    services::GraphService,
};
pub use response::{ApiError, JsonEnvelope};

pub const LINKS_ROUTE: &str = "/graph/linksList";
pub const NODES_ROUTE: &str = "/graph/nodesList";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub graph: GraphService,
}

/// Build the router for API endpoints
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(LINKS_ROUTE, get(links_list))
        .route(NODES_ROUTE, get(nodes_list))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handler for `GET /graph/linksList`
async fn links_list(State(state): State<AppState>) -> Result<JsonEnvelope<LinkList>, ApiError> {
    let trace_ctx = TraceContext::for_route(LINKS_ROUTE);
    let data = state.graph.list_links(&trace_ctx).await?;
    info!(trace_id = %trace_ctx.trace_id, count = data.len(), "Listed graph links");
    Ok(JsonEnvelope::ok(LinkList { data }))
}

/// Handler for `GET /graph/nodesList`
async fn nodes_list(State(state): State<AppState>) -> Result<JsonEnvelope<Vec<GraphNodeView>>, ApiError> {
    let trace_ctx = TraceContext::for_route(NODES_ROUTE);
    let nodes = state.graph.list_nodes(&trace_ctx).await?;
    info!(trace_id = %trace_ctx.trace_id, count = nodes.len(), "Listed graph nodes");
    Ok(JsonEnvelope::ok(nodes))
}

// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "UP",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
