//! Decoded graph records
//!
//! Query results arrive from the store as loosely typed columns. Every column is
//! decoded into a [`GraphValue`] variant before anything reads it, so the mapping
//! layer only ever sees nodes and relationships whose shape has been checked.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::data::errors::MappingError;

/// A node as returned by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRecord {
    /// Store-internal numeric identity
    pub identity: i64,
    /// Driver-assigned element id
    pub element_id: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// A relationship as returned by the graph store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRecord {
    pub identity: i64,
    pub element_id: String,
    #[serde(rename = "type")]
    pub rel_type: String,
    #[serde(default)]
    pub properties: Map<String, Value>,
}

/// One decoded column value.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphValue {
    Node(NodeRecord),
    Relationship(RelationshipRecord),
}

impl GraphValue {
    fn kind(&self) -> &'static str {
        match self {
            GraphValue::Node(_) => "node",
            GraphValue::Relationship(_) => "relationship",
        }
    }
}

/// One result row, keyed by the column alias used in the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GraphRecord {
    columns: HashMap<String, GraphValue>,
}

impl GraphRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: GraphValue) -> Self {
        self.insert(column, value);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, value: GraphValue) {
        self.columns.insert(column.into(), value);
    }

    pub fn get(&self, column: &str) -> Option<&GraphValue> {
        self.columns.get(column)
    }

    pub fn node(&self, column: &str) -> Result<&NodeRecord, MappingError> {
        match self.get(column) {
            Some(GraphValue::Node(node)) => Ok(node),
            Some(other) => Err(MappingError::UnexpectedValue {
                column: column.to_string(),
                expected: "node",
                found: other.kind(),
            }),
            None => Err(MappingError::MissingColumn(column.to_string())),
        }
    }

    pub fn relationship(&self, column: &str) -> Result<&RelationshipRecord, MappingError> {
        match self.get(column) {
            Some(GraphValue::Relationship(rel)) => Ok(rel),
            Some(other) => Err(MappingError::UnexpectedValue {
                column: column.to_string(),
                expected: "relationship",
                found: other.kind(),
            }),
            None => Err(MappingError::MissingColumn(column.to_string())),
        }
    }
}

impl NodeRecord {
    /// The first label, used as the node's display type.
    pub fn primary_label(&self) -> Result<&str, MappingError> {
        self.labels
            .first()
            .map(String::as_str)
            .ok_or(MappingError::MissingLabel { identity: self.identity })
    }

    /// Reads a property usable as an identifier. Strings are taken as-is,
    /// integers are rendered in decimal.
    pub fn id_property(&self, property: &str) -> Result<String, MappingError> {
        match self.properties.get(property) {
            Some(Value::String(s)) => Ok(s.clone()),
            Some(Value::Number(n)) if n.is_i64() || n.is_u64() => Ok(n.to_string()),
            Some(Value::Null) | None => Err(MappingError::MissingProperty {
                identity: self.identity,
                property: property.to_string(),
            }),
            Some(_) => Err(MappingError::InvalidProperty {
                identity: self.identity,
                property: property.to_string(),
            }),
        }
    }

    /// Reads an optional text property. Non-string scalars are rendered as JSON.
    pub fn text_property(&self, property: &str) -> Option<String> {
        match self.properties.get(property) {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Null) | None => None,
            Some(other) => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(value: Value) -> NodeRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_node_from_store_map() {
        let decoded = node(json!({
            "identity": 42,
            "elementId": "4:abc:42",
            "labels": ["Dataset", "Indexed"],
            "properties": {"id": "d1", "name": "docs"}
        }));
        assert_eq!(decoded.identity, 42);
        assert_eq!(decoded.element_id, "4:abc:42");
        assert_eq!(decoded.primary_label().unwrap(), "Dataset");
        assert_eq!(decoded.id_property("id").unwrap(), "d1");
        assert_eq!(decoded.text_property("name").as_deref(), Some("docs"));
    }

    #[test]
    fn test_decode_relationship_type_field() {
        let rel: RelationshipRecord = serde_json::from_value(json!({
            "identity": 5,
            "elementId": "5:abc:5",
            "type": "BELONGS_TO"
        }))
        .unwrap();
        assert_eq!(rel.rel_type, "BELONGS_TO");
        assert!(rel.properties.is_empty());
    }

    #[test]
    fn test_missing_label_and_property() {
        let decoded = node(json!({"identity": 1, "elementId": "e1"}));
        assert_eq!(decoded.primary_label(), Err(MappingError::MissingLabel { identity: 1 }));
        assert_eq!(
            decoded.id_property("id"),
            Err(MappingError::MissingProperty { identity: 1, property: "id".into() })
        );
        assert_eq!(decoded.text_property("name"), None);
    }

    #[test]
    fn test_numeric_and_invalid_id_property() {
        let decoded = node(json!({
            "identity": 2,
            "elementId": "e2",
            "labels": ["Chunk"],
            "properties": {"id": 17, "bad": [1, 2]}
        }));
        assert_eq!(decoded.id_property("id").unwrap(), "17");
        assert_eq!(
            decoded.id_property("bad"),
            Err(MappingError::InvalidProperty { identity: 2, property: "bad".into() })
        );
    }

    #[test]
    fn test_record_column_variants() {
        let n = node(json!({"identity": 1, "elementId": "e1", "labels": ["A"]}));
        let record = GraphRecord::new().with("n", GraphValue::Node(n));
        assert!(record.node("n").is_ok());
        assert_eq!(
            record.relationship("n"),
            Err(MappingError::UnexpectedValue {
                column: "n".into(),
                expected: "relationship",
                found: "node",
            })
        );
        assert_eq!(record.node("m"), Err(MappingError::MissingColumn("m".into())));
    }
}
