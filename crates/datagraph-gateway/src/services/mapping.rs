//! Maps decoded graph records to the display shapes served by the routes.

use crate::data::{
    entities::{GraphLink, GraphNodeView},
    errors::MappingError,
    types::{GraphRecord, NodeRecord},
};

/// Relationship type whose source node is referenced by its `id` property.
///
/// Every other relationship references its source by the store identity.
/// The two schemes reflect how the producing system labelled each kind of
/// relationship and may be a modelling inconsistency upstream; the branch is
/// kept as-is so that link endpoints keep matching the ids nodes were given.
pub const BELONGS_TO: &str = "BELONGS_TO";

/// Property holding a node's domain id.
pub const ID_PROPERTY: &str = "id";

/// Property holding a node's display name.
pub const NAME_PROPERTY: &str = "name";

fn display_ref(node: &NodeRecord, id: impl std::fmt::Display) -> Result<String, MappingError> {
    Ok(format!("{}-{}", node.primary_label()?, id))
}

/// Maps one `(a)-[r]->(b)` row to a link.
pub fn map_link(record: &GraphRecord) -> Result<GraphLink, MappingError> {
    let a = record.node("a")?;
    let r = record.relationship("r")?;
    let b = record.node("b")?;

    let source = if r.rel_type == BELONGS_TO {
        display_ref(a, a.id_property(ID_PROPERTY)?)?
    } else {
        display_ref(a, a.identity)?
    };
    let target = display_ref(b, b.id_property(ID_PROPERTY)?)?;

    Ok(GraphLink { source, target })
}

/// Maps one `(n)` row to a node view.
pub fn map_node(record: &GraphRecord) -> Result<GraphNodeView, MappingError> {
    let n = record.node("n")?;
    Ok(GraphNodeView {
        id: n.element_id.clone(),
        name: n.text_property(NAME_PROPERTY),
        node_type: n.primary_label()?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::types::{GraphValue, RelationshipRecord};
    use pretty_assertions::assert_eq;
    use serde_json::{json, Map, Value};

    fn node(identity: i64, label: &str, properties: Value) -> GraphValue {
        let properties: Map<String, Value> = match properties {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        GraphValue::Node(NodeRecord {
            identity,
            element_id: format!("4:db:{}", identity),
            labels: vec![label.to_string()],
            properties,
        })
    }

    fn rel(rel_type: &str) -> GraphValue {
        GraphValue::Relationship(RelationshipRecord {
            identity: 900,
            element_id: "5:db:900".into(),
            rel_type: rel_type.into(),
            properties: Map::new(),
        })
    }

    fn triple(a: GraphValue, r: GraphValue, b: GraphValue) -> GraphRecord {
        GraphRecord::new().with("a", a).with("r", r).with("b", b)
    }

    #[test]
    fn belongs_to_uses_source_id_property() {
        let record = triple(
            node(1, "Label1", json!({"id": "x1"})),
            rel(BELONGS_TO),
            node(2, "Label2", json!({"id": "y1"})),
        );
        assert_eq!(
            map_link(&record).unwrap(),
            GraphLink { source: "Label1-x1".into(), target: "Label2-y1".into() }
        );
    }

    #[test]
    fn other_relationships_use_source_identity() {
        let record = triple(
            node(42, "Label1", json!({"id": "x1"})),
            rel("OTHER"),
            node(2, "Label2", json!({"id": "y1"})),
        );
        assert_eq!(
            map_link(&record).unwrap(),
            GraphLink { source: "Label1-42".into(), target: "Label2-y1".into() }
        );
    }

    #[test]
    fn other_relationships_do_not_need_source_id_property() {
        let record = triple(node(42, "Label1", json!({})), rel("OTHER"), node(2, "Label2", json!({"id": 7})));
        let link = map_link(&record).unwrap();
        assert_eq!(link.source, "Label1-42");
        assert_eq!(link.target, "Label2-7");
    }

    #[test]
    fn target_always_needs_id_property() {
        for rel_type in [BELONGS_TO, "OTHER"] {
            let record = triple(
                node(1, "Label1", json!({"id": "x1"})),
                rel(rel_type),
                node(2, "Label2", json!({})),
            );
            assert_eq!(
                map_link(&record),
                Err(MappingError::MissingProperty { identity: 2, property: "id".into() })
            );
        }
    }

    #[test]
    fn unlabelled_node_is_rejected() {
        let record = GraphRecord::new().with(
            "n",
            GraphValue::Node(NodeRecord {
                identity: 3,
                element_id: "4:db:3".into(),
                labels: vec![],
                properties: Map::new(),
            }),
        );
        assert_eq!(map_node(&record), Err(MappingError::MissingLabel { identity: 3 }));
    }

    #[test]
    fn node_view_uses_element_id_and_optional_name() {
        let named = GraphRecord::new().with("n", node(8, "Collection", json!({"name": "docs"})));
        assert_eq!(
            map_node(&named).unwrap(),
            GraphNodeView { id: "4:db:8".into(), name: Some("docs".into()), node_type: "Collection".into() }
        );

        let unnamed = GraphRecord::new().with("n", node(9, "Dataset", json!({})));
        let view = map_node(&unnamed).unwrap();
        assert_eq!(view.name, None);
        assert_eq!(serde_json::to_value(&view).unwrap(), json!({"id": "4:db:9", "type": "Dataset"}));
    }
}
