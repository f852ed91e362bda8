//! Services answering the graph listing routes

pub mod graph_service;
pub mod mapping;

// Re-exports
pub use graph_service::{GraphService, LINKS_QUERY, NODES_QUERY};
pub use mapping::{map_link, map_node, BELONGS_TO};
