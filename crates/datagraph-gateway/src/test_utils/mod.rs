//! In-memory doubles for exercising services and routes without Neo4j

pub mod fake_store;
pub mod fixtures;

pub use fake_store::FakeGraphStore;
pub use fixtures::{node, relationship};
