//! Dataset graph gateway
//!
//! Lists the nodes and links of the dataset graph over HTTP. Each request opens
//! one session on an injected [`GraphStore`], runs a fixed read query, decodes
//! the rows into tagged variants and maps them into display shapes.

// Core modules
pub mod api;
pub mod config;
pub mod data;
pub mod services;
pub mod traits;

// Implementation adapters (optional, can be provided externally)
#[cfg(feature = "adapters")]
pub mod adapters;

// Testing utilities, public so integration tests can use them
pub mod test_utils;

// Re-export key types for convenient usage
pub use api::{build_router, AppState};
pub use config::GatewayConfig;
pub use data::{
    ErrorDetail, GatewayError, GraphLink, GraphNodeView, GraphRecord, GraphValue, LinkList,
    MappingError, NodeRecord, RelationshipRecord, StoreError, TraceContext,
};
pub use services::GraphService;
pub use traits::{GraphSession, GraphStore, Projection, ReadQuery};

/// Initialize tracing for the gateway. `RUST_LOG` wins over `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();
}
