use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

use datagraph_gateway::{
    build_router,
    services::{BELONGS_TO, LINKS_QUERY, NODES_QUERY},
    test_utils::{node, relationship, FakeGraphStore},
    AppState, GraphRecord, GraphService, StoreError,
};

fn router_for(store: Arc<FakeGraphStore>) -> Router {
    build_router(AppState {
        graph: GraphService::new(store),
    })
}

async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn link_row(a: Value, a_identity: i64, rel_type: &str, b: Value) -> GraphRecord {
    GraphRecord::new()
        .with("a", node(a_identity, &["Label1"], a))
        .with("r", relationship(100 + a_identity, rel_type))
        .with("b", node(a_identity + 1000, &["Label2"], b))
}

#[tokio::test]
async fn links_list_maps_both_source_schemes() {
    let store = Arc::new(FakeGraphStore::new().with_rows(
        LINKS_QUERY.pattern,
        vec![
            link_row(json!({"id": "x1"}), 1, BELONGS_TO, json!({"id": "y1"})),
            link_row(json!({"id": "x2"}), 42, "OTHER", json!({"id": "y1"})),
        ],
    ));

    let (status, body) = get_json(router_for(Arc::clone(&store)), "/graph/linksList").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(
        body["data"]["data"],
        json!([
            {"source": "Label1-x1", "target": "Label2-y1"},
            {"source": "Label1-42", "target": "Label2-y1"},
        ])
    );
    assert!(body.get("error").is_none());
    assert_eq!(store.sessions_opened(), 1);
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn nodes_list_returns_array_as_data() {
    let store = Arc::new(FakeGraphStore::new().with_rows(
        NODES_QUERY.pattern,
        vec![
            GraphRecord::new().with("n", node(7, &["Dataset"], json!({"name": "docs"}))),
            GraphRecord::new().with("n", node(8, &["Collection", "Folder"], json!({}))),
        ],
    ));

    let (status, body) = get_json(router_for(Arc::clone(&store)), "/graph/nodesList").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!([
            {"id": "4:fixture:7", "name": "docs", "type": "Dataset"},
            {"id": "4:fixture:8", "type": "Collection"},
        ])
    );
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn empty_graph_returns_empty_arrays() {
    let store = Arc::new(FakeGraphStore::new());

    let (status, links) = get_json(router_for(Arc::clone(&store)), "/graph/linksList").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(links["data"]["data"], json!([]));

    let (status, nodes) = get_json(router_for(Arc::clone(&store)), "/graph/nodesList").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(nodes["data"], json!([]));

    assert_eq!(store.sessions_opened(), 2);
    assert_eq!(store.sessions_closed(), 2);
}

#[tokio::test]
async fn query_failure_returns_500_and_releases_session_once() {
    let store = Arc::new(
        FakeGraphStore::new()
            .failing(LINKS_QUERY.pattern, "connection reset")
            .failing(NODES_QUERY.pattern, "connection reset"),
    );

    for uri in ["/graph/linksList", "/graph/nodesList"] {
        let (status, body) = get_json(router_for(Arc::clone(&store)), uri).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["code"], 500);
        assert_eq!(body["data"], Value::Null);
        assert_eq!(body["error"]["kind"], "QueryError");
        assert_eq!(body["error"]["message"], "Graph query execution error: connection reset");
    }

    assert_eq!(store.sessions_opened(), 2);
    assert_eq!(store.sessions_closed(), 2);
}

#[tokio::test]
async fn undecodable_row_returns_500_and_releases_session() {
    // Target node without an `id` property cannot be referenced
    let store = Arc::new(FakeGraphStore::new().with_rows(
        LINKS_QUERY.pattern,
        vec![link_row(json!({"id": "x1"}), 1, BELONGS_TO, json!({"name": "no id"}))],
    ));

    let (status, body) = get_json(router_for(Arc::clone(&store)), "/graph/linksList").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["kind"], "MappingError");
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn store_decode_failure_returns_decode_error_kind() {
    let store = Arc::new(FakeGraphStore::new().failing_with(
        NODES_QUERY.pattern,
        StoreError::DecodeError("column `n` is not a node: missing field `elementId`".into()),
    ));

    let (status, body) = get_json(router_for(Arc::clone(&store)), "/graph/nodesList").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["error"]["kind"], "DecodeError");
    assert_eq!(store.sessions_opened(), 1);
    assert_eq!(store.sessions_closed(), 1);
}

#[tokio::test]
async fn shut_down_store_refuses_sessions() {
    let store = Arc::new(FakeGraphStore::new());
    datagraph_gateway::GraphStore::shutdown(store.as_ref()).await.unwrap();

    let (status, body) = get_json(router_for(Arc::clone(&store)), "/graph/nodesList").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["kind"], "StoreClosed");
    assert_eq!(store.sessions_opened(), 0);
    assert_eq!(store.sessions_closed(), 0);
}

#[tokio::test]
async fn health_check_reports_up() {
    let (status, body) = get_json(router_for(Arc::new(FakeGraphStore::new())), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "UP");
}
