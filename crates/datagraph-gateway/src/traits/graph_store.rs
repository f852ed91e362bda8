//! GraphStore trait definition for graph database interaction

use async_trait::async_trait;

use crate::data::{errors::StoreError, trace_context::TraceContext, types::GraphRecord};

/// How a returned column should be projected and decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Column holds a node bound to this alias in the pattern
    Node(&'static str),
    /// Column holds a relationship bound to this alias in the pattern
    Relationship(&'static str),
}

impl Projection {
    pub fn alias(&self) -> &'static str {
        match self {
            Projection::Node(alias) | Projection::Relationship(alias) => alias,
        }
    }
}

/// A fixed read-only query: a `MATCH` pattern plus the aliases it returns.
///
/// Stores render the `RETURN` clause themselves so that every column comes
/// back in a shape they know how to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadQuery {
    pub pattern: &'static str,
    pub returns: &'static [Projection],
}

/// An open unit of work against the graph store.
///
/// `close` consumes the session, so a session is released at most once.
#[async_trait]
pub trait GraphSession: Send {
    /// Runs a read query and decodes every row.
    async fn run(
        &mut self,
        trace_ctx: &TraceContext,
        query: &ReadQuery,
    ) -> Result<Vec<GraphRecord>, StoreError>;

    /// Releases the session and whatever connection it holds.
    ///
    /// Implementations also release on drop, so a session abandoned by a
    /// cancelled request is still given back exactly once.
    async fn close(self: Box<Self>) -> Result<(), StoreError>;
}

/// Represents the interface for interacting with the graph database.
/// This abstracts the underlying database technology (e.g., Neo4j).
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Opens a new session. Fails once the store has been shut down.
    async fn open_session(&self) -> Result<Box<dyn GraphSession>, StoreError>;

    /// Stops handing out sessions. Driver resources such as the connection
    /// pool are released when the store itself is dropped.
    async fn shutdown(&self) -> Result<(), StoreError>;
}
