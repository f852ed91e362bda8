//! Live test against Neo4j. Skipped unless `NEO4J_URI` is set.

use std::{env, sync::Arc};

use dotenv::dotenv;
use neo4rs::{query, ConfigBuilder, Graph};
use tracing::info;

use datagraph_gateway::{
    adapters::{Neo4jConfig, Neo4jGraphStore},
    GraphService, GraphStore, TraceContext,
};

async fn raw_graph(config: &Neo4jConfig) -> Graph {
    let neo4j_config = ConfigBuilder::default()
        .uri(&config.uri)
        .user(&config.username)
        .password(&config.password)
        .build()
        .unwrap();
    Graph::connect(neo4j_config).await.unwrap()
}

#[tokio::test]
async fn test_links_and_nodes_against_neo4j() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("datagraph_gateway=debug,neo4j_graph_test=debug")
        .try_init();

    dotenv().ok();
    if env::var("NEO4J_URI").is_err() {
        info!("NEO4J_URI not set, skipping test");
        return;
    }

    let config = Neo4jConfig::from_env();
    let graph = raw_graph(&config).await;
    let run_id = uuid::Uuid::new_v4().simple().to_string();
    let collection_label = format!("DgCollection_{}", &run_id[..8]);
    let dataset_label = format!("DgDataset_{}", &run_id[..8]);

    graph
        .run(query(&format!(
            "CREATE (c:{c} {{id: 'c1', name: 'guide'}})-[:BELONGS_TO]->(d:{d} {{id: 'd1', name: 'docs'}}), \
             (x:{c} {{name: 'orphan'}})-[:MENTIONS]->(d)",
            c = collection_label,
            d = dataset_label
        )))
        .await
        .unwrap();

    let store = Arc::new(Neo4jGraphStore::connect(config).await.unwrap());
    let service = GraphService::new(store.clone());
    let trace_ctx = TraceContext::for_route("/graph/linksList");

    let links = service.list_links(&trace_ctx).await.unwrap();
    let ours: Vec<_> = links
        .iter()
        .filter(|link| link.target == format!("{}-d1", dataset_label))
        .collect();
    assert_eq!(ours.len(), 2);
    assert!(ours.iter().any(|l| l.source == format!("{}-c1", collection_label)));
    assert!(ours
        .iter()
        .any(|l| l.source.starts_with(&collection_label) && l.source[collection_label.len() + 1..].parse::<i64>().is_ok()));

    let nodes = service.list_nodes(&trace_ctx).await.unwrap();
    assert!(nodes
        .iter()
        .any(|n| n.node_type == dataset_label && n.name.as_deref() == Some("docs")));
    assert_eq!(store.active_sessions(), 0);

    graph
        .run(query(&format!(
            "MATCH (n) WHERE n:{} OR n:{} DETACH DELETE n",
            collection_label, dataset_label
        )))
        .await
        .unwrap();
    store.shutdown().await.unwrap();
}
