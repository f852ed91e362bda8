//! Core data structures for the dataset graph gateway

pub mod types;
pub mod entities;
pub mod errors;
pub mod trace_context;

pub use types::{GraphRecord, GraphValue, NodeRecord, RelationshipRecord};
pub use entities::{GraphLink, GraphNodeView, LinkList};
pub use errors::{ErrorDetail, GatewayError, MappingError, StoreError};
pub use trace_context::TraceContext;
