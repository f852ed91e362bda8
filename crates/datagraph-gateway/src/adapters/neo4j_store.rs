use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query};
use parking_lot::RwLock;
use std::{
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    data::{
        errors::StoreError,
        trace_context::TraceContext,
        types::{GraphRecord, GraphValue, NodeRecord, RelationshipRecord},
    },
    traits::graph_store::{GraphSession, GraphStore, Projection, ReadQuery},
};

macro_rules! trace_neo4j {
    ($trace_ctx:expr, $op:expr, $($arg:tt)*) => {
        debug!("[Neo4j:{}][trace:{}] {}", $op, $trace_ctx.trace_id, format!($($arg)*));
    };
}

/// Configuration for Neo4j connection
#[derive(Debug, Clone)]
pub struct Neo4jConfig {
    pub uri: String,
    pub username: String,
    pub password: String,
    pub database: Option<String>,
    pub pool_size: usize,
    pub connection_timeout: Duration,
    pub connection_retry_count: u32,
    pub connection_retry_delay: Duration,
    pub query_timeout: Duration,
}

impl Default for Neo4jConfig {
    fn default() -> Self {
        Self {
            uri: "neo4j://localhost:7687".to_string(),
            username: "neo4j".to_string(),
            password: "password".to_string(),
            database: None,
            pool_size: 10,
            connection_timeout: Duration::from_secs(30),
            connection_retry_count: 3,
            connection_retry_delay: Duration::from_secs(2),
            query_timeout: Duration::from_secs(30),
        }
    }
}

impl Neo4jConfig {
    /// Reads `NEO4J_*` environment variables over the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            uri: std::env::var("NEO4J_URI").unwrap_or(defaults.uri),
            username: std::env::var("NEO4J_USERNAME").unwrap_or(defaults.username),
            password: std::env::var("NEO4J_PASSWORD").unwrap_or(defaults.password),
            database: std::env::var("NEO4J_DATABASE").ok(),
            pool_size: match std::env::var("NEO4J_POOL_SIZE") {
                Ok(value) => value.parse().unwrap_or_else(|_| {
                    warn!("Invalid NEO4J_POOL_SIZE value: {}", value);
                    defaults.pool_size
                }),
                Err(_) => defaults.pool_size,
            },
            ..defaults
        }
    }
}

/// Neo4j implementation of the `GraphStore` trait
pub struct Neo4jGraphStore {
    graph: Arc<Graph>,
    config: Neo4jConfig,
    closed: RwLock<bool>,
    active_sessions: Arc<AtomicUsize>,
    next_session_id: AtomicU64,
}

impl Neo4jGraphStore {
    /// Returns the configuration used for this store
    pub fn get_config(&self) -> &Neo4jConfig {
        &self.config
    }

    /// Number of sessions opened and not yet closed
    pub fn active_sessions(&self) -> usize {
        self.active_sessions.load(Ordering::SeqCst)
    }

    /// Connects to Neo4j, retrying up to `connection_retry_count` times.
    pub async fn connect(config: Neo4jConfig) -> Result<Self, StoreError> {
        let mut config_builder = ConfigBuilder::default()
            .uri(&config.uri)
            .user(&config.username)
            .password(&config.password)
            .max_connections(config.pool_size);

        if let Some(db) = &config.database {
            config_builder = config_builder.db(db.as_str());
        }

        let neo4j_config = config_builder
            .build()
            .map_err(|e| StoreError::ConnectionError(format!("Failed to build Neo4j config: {}", e)))?;

        let mut last_error = String::from("no connection attempt made");
        for attempt in 1..=config.connection_retry_count {
            match tokio::time::timeout(config.connection_timeout, Graph::connect(neo4j_config.clone())).await {
                Ok(Ok(graph)) => {
                    info!("Connected to Neo4j at {} (attempt {})", config.uri, attempt);

                    // Test the connection with a simple query
                    match graph.run(Query::new("RETURN 1".to_string())).await {
                        Ok(()) => {
                            return Ok(Self {
                                graph: Arc::new(graph),
                                config,
                                closed: RwLock::new(false),
                                active_sessions: Arc::new(AtomicUsize::new(0)),
                                next_session_id: AtomicU64::new(1),
                            });
                        }
                        Err(e) => {
                            error!("Connection test failed: {}", e);
                            last_error = e.to_string();
                        }
                    }
                }
                Ok(Err(e)) => {
                    error!("Failed to connect to Neo4j (attempt {}): {}", attempt, e);
                    last_error = e.to_string();
                }
                Err(_) => {
                    error!("Timed out connecting to Neo4j (attempt {})", attempt);
                    last_error = format!("timed out after {:?}", config.connection_timeout);
                }
            }
            if attempt < config.connection_retry_count {
                tokio::time::sleep(config.connection_retry_delay).await;
            }
        }

        Err(StoreError::ConnectionError(format!(
            "Failed to connect to Neo4j after {} attempts. Last error: {}",
            config.connection_retry_count, last_error
        )))
    }
}

/// Renders the full Cypher text for a read query.
///
/// Each returned alias is projected into a map with a fixed set of keys so
/// that decoding does not depend on driver-specific node types.
pub fn render_cypher(query: &ReadQuery) -> String {
    let columns: Vec<String> = query
        .returns
        .iter()
        .map(|projection| match projection {
            Projection::Node(alias) => format!(
                "{{identity: id({a}), elementId: elementId({a}), labels: labels({a}), properties: properties({a})}} AS {a}",
                a = alias
            ),
            Projection::Relationship(alias) => format!(
                "{{identity: id({a}), elementId: elementId({a}), type: type({a}), properties: properties({a})}} AS {a}",
                a = alias
            ),
        })
        .collect();
    format!("{} RETURN {}", query.pattern.trim(), columns.join(", "))
}

fn decode_row(row: &neo4rs::Row, returns: &[Projection]) -> Result<GraphRecord, StoreError> {
    let mut record = GraphRecord::new();
    for projection in returns {
        let alias = projection.alias();
        let raw = row
            .get::<serde_json::Value>(alias)
            .map_err(|e| StoreError::DecodeError(format!("column `{}`: {}", alias, e)))?;
        let value = match projection {
            Projection::Node(_) => GraphValue::Node(
                serde_json::from_value::<NodeRecord>(raw)
                    .map_err(|e| StoreError::DecodeError(format!("column `{}` is not a node: {}", alias, e)))?,
            ),
            Projection::Relationship(_) => GraphValue::Relationship(
                serde_json::from_value::<RelationshipRecord>(raw).map_err(|e| {
                    StoreError::DecodeError(format!("column `{}` is not a relationship: {}", alias, e))
                })?,
            ),
        };
        record.insert(alias, value);
    }
    Ok(record)
}

#[async_trait]
impl GraphStore for Neo4jGraphStore {
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, StoreError> {
        if *self.closed.read() {
            return Err(StoreError::Closed);
        }
        let id = self.next_session_id.fetch_add(1, Ordering::SeqCst);
        let active = self.active_sessions.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(session_id = id, active, "Opened Neo4j session");
        Ok(Box::new(Neo4jSession {
            id,
            graph: Arc::clone(&self.graph),
            query_timeout: self.config.query_timeout,
            active_sessions: Arc::clone(&self.active_sessions),
        }))
    }

    async fn shutdown(&self) -> Result<(), StoreError> {
        let mut closed = self.closed.write();
        if *closed {
            return Ok(());
        }
        *closed = true;
        let active = self.active_sessions();
        if active > 0 {
            warn!("Shutting down Neo4j store with {} sessions still open", active);
        } else {
            info!("Neo4j store shut down");
        }
        Ok(())
    }
}

/// A Neo4j session. Queries borrow pooled connections from the shared graph.
struct Neo4jSession {
    id: u64,
    graph: Arc<Graph>,
    query_timeout: Duration,
    active_sessions: Arc<AtomicUsize>,
}

#[async_trait]
impl GraphSession for Neo4jSession {
    #[instrument(skip(self, query), fields(session_id = self.id, trace_id = %trace_ctx.trace_id))]
    async fn run(
        &mut self,
        trace_ctx: &TraceContext,
        query: &ReadQuery,
    ) -> Result<Vec<GraphRecord>, StoreError> {
        let cypher = render_cypher(query);
        trace_neo4j!(trace_ctx, "run", "{}", cypher);

        let mut stream = match tokio::time::timeout(self.query_timeout, self.graph.execute(Query::new(cypher))).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                return Err(StoreError::QueryError(format!("Failed to execute query: {}", e)));
            }
            Err(_) => {
                return Err(StoreError::QueryError(format!(
                    "Query timed out after {:?}",
                    self.query_timeout
                )));
            }
        };

        let mut records = Vec::new();
        loop {
            match stream.next().await {
                Ok(Some(row)) => records.push(decode_row(&row, query.returns)?),
                Ok(None) => break,
                Err(e) => {
                    return Err(StoreError::QueryError(format!("Failed to read result row: {}", e)));
                }
            }
        }
        trace_neo4j!(trace_ctx, "run", "{} rows", records.len());
        Ok(records)
    }

    async fn close(self: Box<Self>) -> Result<(), StoreError> {
        drop(self);
        Ok(())
    }
}

// Released on drop so a cancelled request still gives its slot back.
impl Drop for Neo4jSession {
    fn drop(&mut self) {
        let remaining = self.active_sessions.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        debug!(session_id = self.id, remaining, "Closed Neo4j session");
    }
}
