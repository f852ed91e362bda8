use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::{
    data::{
        entities::{GraphLink, GraphNodeView},
        errors::GatewayError,
        trace_context::TraceContext,
        types::GraphRecord,
    },
    services::mapping::{map_link, map_node},
    traits::graph_store::{GraphStore, Projection, ReadQuery},
};

/// All directed relationships with both endpoints.
pub const LINKS_QUERY: ReadQuery = ReadQuery {
    pattern: "MATCH (a)-[r]->(b)",
    returns: &[Projection::Node("a"), Projection::Relationship("r"), Projection::Node("b")],
};

/// Every node in the graph.
pub const NODES_QUERY: ReadQuery = ReadQuery {
    pattern: "MATCH (n)",
    returns: &[Projection::Node("n")],
};

/// Service answering the graph listing routes against an injected store.
#[derive(Clone)]
pub struct GraphService {
    store: Arc<dyn GraphStore>,
}

impl GraphService {
    pub fn new(store: Arc<dyn GraphStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Lists every `(a)-[r]->(b)` triple as a `{source, target}` link.
    #[instrument(skip(self), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn list_links(&self, trace_ctx: &TraceContext) -> Result<Vec<GraphLink>, GatewayError> {
        let records = self.read_all(trace_ctx, &LINKS_QUERY).await?;
        let links = records.iter().map(map_link).collect::<Result<Vec<_>, _>>()?;
        debug!("Mapped {} links", links.len());
        Ok(links)
    }

    /// Lists every node as `{id, name, type}`.
    #[instrument(skip(self), fields(trace_id = %trace_ctx.trace_id))]
    pub async fn list_nodes(&self, trace_ctx: &TraceContext) -> Result<Vec<GraphNodeView>, GatewayError> {
        let records = self.read_all(trace_ctx, &NODES_QUERY).await?;
        let nodes = records.iter().map(map_node).collect::<Result<Vec<_>, _>>()?;
        debug!("Mapped {} nodes", nodes.len());
        Ok(nodes)
    }

    /// Runs one query inside its own session. The session is closed on
    /// every path once the session was opened, whatever the query outcome.
    /// If this future is dropped mid-query the session is released on drop.
    async fn read_all(
        &self,
        trace_ctx: &TraceContext,
        query: &ReadQuery,
    ) -> Result<Vec<GraphRecord>, GatewayError> {
        let mut session = self.store.open_session().await?;
        let result = session.run(trace_ctx, query).await;

        if let Err(e) = session.close().await {
            warn!(trace_id = %trace_ctx.trace_id, "Failed to close graph session: {}", e);
        }

        Ok(result?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::errors::StoreError, test_utils::FakeGraphStore};
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_request_releases_session() {
        let store = Arc::new(FakeGraphStore::new().with_delay(LINKS_QUERY.pattern, Duration::from_secs(10)));
        let service = GraphService::new(store.clone());

        let request = tokio::spawn(async move {
            let trace_ctx = TraceContext::for_route("/graph/linksList");
            service.list_links(&trace_ctx).await
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.sessions_closed(), 0);

        request.abort();
        assert!(request.await.unwrap_err().is_cancelled());

        assert_eq!(store.sessions_opened(), 1);
        assert_eq!(store.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_releases_session() {
        let store = Arc::new(FakeGraphStore::new().failing_with(
            NODES_QUERY.pattern,
            StoreError::DecodeError("column `n` is not a node".into()),
        ));
        let service = GraphService::new(store.clone());

        let err = service
            .list_nodes(&TraceContext::for_route("/graph/nodesList"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "DecodeError");
        assert_eq!(store.sessions_closed(), 1);
    }
}
