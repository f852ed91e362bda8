//! Core traits (interfaces) for the dataset graph gateway

pub mod graph_store;

pub use graph_store::{GraphSession, GraphStore, Projection, ReadQuery};
