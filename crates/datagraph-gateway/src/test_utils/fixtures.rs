use serde_json::{Map, Value};

use crate::data::types::{GraphValue, NodeRecord, RelationshipRecord};

/// Builds a node value. `properties` must be a JSON object or null.
pub fn node(identity: i64, labels: &[&str], properties: Value) -> GraphValue {
    GraphValue::Node(NodeRecord {
        identity,
        element_id: format!("4:fixture:{}", identity),
        labels: labels.iter().map(|l| l.to_string()).collect(),
        properties: into_map(properties),
    })
}

/// Builds a relationship value of the given type.
pub fn relationship(identity: i64, rel_type: &str) -> GraphValue {
    GraphValue::Relationship(RelationshipRecord {
        identity,
        element_id: format!("5:fixture:{}", identity),
        rel_type: rel_type.to_string(),
        properties: Map::new(),
    })
}

fn into_map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
