//! Error types for the dataset graph gateway

use serde::Serialize;
use thiserror::Error;

/// Error type for the graph store (graph database interaction).
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Graph database connection error: {0}")]
    ConnectionError(String),
    #[error("Graph query execution error: {0}")]
    QueryError(String),
    #[error("Failed to decode graph record: {0}")]
    DecodeError(String),
    #[error("Graph session error: {0}")]
    SessionError(String),
    #[error("Graph store has been shut down")]
    Closed,
}

/// Errors raised while turning decoded records into display shapes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("Column `{0}` missing from record")]
    MissingColumn(String),
    #[error("Column `{column}` holds a {found}, expected a {expected}")]
    UnexpectedValue {
        column: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Node {identity} has no labels")]
    MissingLabel { identity: i64 },
    #[error("Node {identity} has no `{property}` property")]
    MissingProperty { identity: i64, property: String },
    #[error("Node {identity} property `{property}` cannot be used as an id")]
    InvalidProperty { identity: i64, property: String },
}

/// Top-level error for one gateway request.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),
}

/// Serializable view of a [`GatewayError`], carried verbatim in the error envelope.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorDetail {
    pub kind: &'static str,
    pub message: String,
}

impl GatewayError {
    /// Short machine-readable error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Store(StoreError::ConnectionError(_)) => "ConnectionError",
            GatewayError::Store(StoreError::QueryError(_)) => "QueryError",
            GatewayError::Store(StoreError::DecodeError(_)) => "DecodeError",
            GatewayError::Store(StoreError::SessionError(_)) => "SessionError",
            GatewayError::Store(StoreError::Closed) => "StoreClosed",
            GatewayError::Mapping(_) => "MappingError",
        }
    }

    pub fn detail(&self) -> ErrorDetail {
        ErrorDetail {
            kind: self.kind(),
            message: self.to_string(),
        }
    }
}
