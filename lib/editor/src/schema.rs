//! Schema readers for persisted nodes and edges.
//!
//! Drafts have been written in two shapes over time. The current shape keys
//! nodes by `node_id` with contract fields at the root and operator settings
//! in `config`. The legacy shape keys them by `id` and keeps everything in a
//! `params` bag. Readers are tried in order and the first to accept a node
//! wins; a node no reader accepts is skipped.

use crate::document::{DraftEdge, DraftNode, EditorState, VersionNode};
use crate::edge::{DEFAULT_SOURCE_PORT, DEFAULT_TARGET_PORT, Edge};
use crate::icon::icon_for;
use crate::node::{ContractField, JsonMap, Node, NodeData, Position};
use flowdesk_core::{EdgeId, NodeId};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reads one draft node, or declines it.
pub type NodeReader = fn(&DraftNode, Option<&EditorState>) -> Option<Node>;

/// Readers in the order they are tried.
pub const NODE_READERS: [(&str, NodeReader); 2] = [
    ("current", read_current_node),
    ("legacy-params", read_legacy_node),
];

/// Slug used when a node names no operator.
pub const FALLBACK_SLUG: &str = "code";

/// `params` keys that are promoted out of a legacy node's config.
const PROMOTED_PARAMS: [&str; 4] = ["title", "slug", "description", "position"];

/// Runs the readers in order.
///
/// Returns the accepted node and the name of the reader that accepted it.
#[must_use]
pub fn read_draft_node(draft: &DraftNode, state: Option<&EditorState>) -> Option<(Node, &'static str)> {
    NODE_READERS
        .iter()
        .find_map(|(name, reader)| reader(draft, state).map(|node| (node, *name)))
}

/// Current schema: keyed by `node_id`.
#[must_use]
pub fn read_current_node(draft: &DraftNode, state: Option<&EditorState>) -> Option<Node> {
    let id = draft.node_id.clone()?;
    Some(build_node(id, draft, state))
}

/// Legacy schema: keyed by `id`, settings in `params`.
#[must_use]
pub fn read_legacy_node(draft: &DraftNode, state: Option<&EditorState>) -> Option<Node> {
    let id = draft.id.clone()?;
    Some(build_node(id, draft, state))
}

fn build_node(id: NodeId, draft: &DraftNode, state: Option<&EditorState>) -> Node {
    let slug = draft
        .operator_slug
        .clone()
        .or_else(|| draft.node_type.clone())
        .or_else(|| draft.param_str("slug").map(str::to_string))
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());

    let title = draft
        .label
        .clone()
        .or_else(|| draft.param_str("title").map(str::to_string))
        .unwrap_or_else(|| id.to_string());

    let description = draft
        .description
        .clone()
        .or_else(|| draft.param_str("description").map(str::to_string));

    let config = match (&draft.config, &draft.params) {
        (Some(config), _) => config.clone(),
        (None, Some(params)) => params
            .iter()
            .filter(|(key, _)| !PROMOTED_PARAMS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        (None, None) => JsonMap::new(),
    };

    let position = state
        .and_then(|state| state.position_of(&id))
        .or_else(|| {
            draft
                .params
                .as_ref()
                .and_then(|params| params.get("position"))
                .and_then(Position::from_value)
        })
        .unwrap_or_default();

    let icon_source = config
        .get("subtitle")
        .and_then(Value::as_str)
        .or_else(|| draft.param_str("subtitle"))
        .or_else(|| draft.param_str("category"))
        .unwrap_or(&slug)
        .to_string();

    let mut data = NodeData::new(title, slug);
    data.description = description;
    data.contract = read_contract(&draft.root);
    data.config = config;
    data.icon = icon_for(&icon_source);

    Node::new(id, position, data)
}

fn read_contract(root: &JsonMap) -> BTreeMap<ContractField, Value> {
    root.iter()
        .filter(|(_, value)| !value.is_null())
        .filter_map(|(key, value)| Some((ContractField::from_key(key)?, value.clone())))
        .collect()
}

/// Reads a node from a published version.
///
/// Returns `None` for a node without `node_id`.
#[must_use]
pub fn read_version_node(version_node: &VersionNode) -> Option<Node> {
    let id = version_node.node_id.clone()?;
    let mut config = version_node.config.clone();
    let position = config
        .remove("position")
        .as_ref()
        .and_then(Position::from_value)
        .unwrap_or_default();

    let slug = version_node
        .operator_slug
        .clone()
        .unwrap_or_else(|| FALLBACK_SLUG.to_string());
    let title = version_node
        .label
        .clone()
        .unwrap_or_else(|| id.to_string());

    let icon_source = config
        .get("subtitle")
        .and_then(Value::as_str)
        .or(version_node.operator_slug.as_deref())
        .or(version_node.label.as_deref())
        .unwrap_or(FALLBACK_SLUG)
        .to_string();

    let mut data = NodeData::new(title, slug);
    data.config = config;
    data.icon = icon_for(&icon_source);
    Some(Node::new(id, position, data))
}

/// Reads a persisted edge.
///
/// Returns `None` when either endpoint is missing. Ports default to
/// `out`/`in` and a missing id is generated.
#[must_use]
pub fn read_edge(draft: &DraftEdge) -> Option<Edge> {
    let source = draft
        .from
        .as_ref()
        .and_then(|end| end.node_id.clone())
        .or_else(|| draft.source.clone())?;
    let target = draft
        .to
        .as_ref()
        .and_then(|end| end.node_id.clone())
        .or_else(|| draft.target.clone())?;

    let source_port = draft
        .from
        .as_ref()
        .and_then(|end| end.port.clone())
        .or_else(|| draft.source_handle.clone())
        .unwrap_or_else(|| DEFAULT_SOURCE_PORT.to_string());
    let target_port = draft
        .to
        .as_ref()
        .and_then(|end| end.port.clone())
        .or_else(|| draft.target_handle.clone())
        .unwrap_or_else(|| DEFAULT_TARGET_PORT.to_string());

    let id = draft.id.clone().unwrap_or_else(EdgeId::generate);
    Some(Edge::with_ports(id, source, source_port, target, target_port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::EdgeEndpoint;
    use crate::icon::IconCategory;
    use serde_json::json;

    fn draft(value: Value) -> DraftNode {
        serde_json::from_value(value).unwrap()
    }

    fn state(value: Value) -> EditorState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn current_reader_reads_root_fields() {
        let node = draft(json!({
            "node_id": "n1",
            "operator_slug": "http-request",
            "label": "Fetch",
            "description": "Fetch users",
            "timeout_ms": 3000,
            "ports": null,
            "config": {"url": "x"},
        }));
        let editor_state = state(json!({"node_positions": {"n1": {"x": 10, "y": 20}}}));
        let (node, reader) = read_draft_node(&node, Some(&editor_state)).unwrap();

        assert_eq!(reader, "current");
        assert_eq!(node.id.as_str(), "n1");
        assert_eq!(node.position, Position::new(10.0, 20.0));
        assert_eq!(node.data.slug, "http-request");
        assert_eq!(node.data.title, "Fetch");
        assert_eq!(node.data.description.as_deref(), Some("Fetch users"));
        assert_eq!(node.data.contract.get(&ContractField::TimeoutMs), Some(&json!(3000)));
        assert!(!node.data.contract.contains_key(&ContractField::Ports));
        assert_eq!(node.data.config_str("url"), Some("x"));
        assert_eq!(node.data.icon, IconCategory::Http);
    }

    #[test]
    fn legacy_reader_falls_back_to_params() {
        let node = draft(json!({
            "id": "old",
            "params": {
                "title": "Legacy step",
                "slug": "filter-rows",
                "description": "d",
                "position": {"x": 5, "y": 6},
                "threshold": 3,
            },
        }));
        let (node, reader) = read_draft_node(&node, None).unwrap();

        assert_eq!(reader, "legacy-params");
        assert_eq!(node.data.title, "Legacy step");
        assert_eq!(node.data.slug, "filter-rows");
        assert_eq!(node.data.description.as_deref(), Some("d"));
        assert_eq!(node.position, Position::new(5.0, 6.0));
        assert_eq!(node.data.config.get("threshold"), Some(&json!(3)));
        assert!(!node.data.config.contains_key("position"));
        assert_eq!(node.data.icon, IconCategory::Filter);
    }

    #[test]
    fn type_key_supplies_slug() {
        let node = draft(json!({"id": "n", "type": "merge"}));
        let (node, _) = read_draft_node(&node, None).unwrap();
        assert_eq!(node.data.slug, "merge");
    }

    #[test]
    fn bare_node_gets_defaults() {
        let node = draft(json!({"node_id": "n9"}));
        let (node, _) = read_draft_node(&node, None).unwrap();
        assert_eq!(node.data.slug, "code");
        assert_eq!(node.data.title, "n9");
        assert_eq!(node.position, Position::default());
        assert!(node.data.config.is_empty());
    }

    #[test]
    fn editor_state_position_wins_over_params() {
        let node = draft(json!({"id": "n", "params": {"position": {"x": 1, "y": 1}}}));
        let editor_state = state(json!({"node_positions": {"n": {"x": 9, "y": 9}}}));
        let (node, _) = read_draft_node(&node, Some(&editor_state)).unwrap();
        assert_eq!(node.position, Position::new(9.0, 9.0));
    }

    #[test]
    fn icon_prefers_subtitle() {
        let node = draft(json!({
            "node_id": "n",
            "operator_slug": "custom",
            "config": {"subtitle": "storage"},
        }));
        let (node, _) = read_draft_node(&node, None).unwrap();
        assert_eq!(node.data.icon, IconCategory::Storage);

        let node = draft(json!({"id": "n", "params": {"category": "webhook"}}));
        let (node, _) = read_draft_node(&node, None).unwrap();
        assert_eq!(node.data.icon, IconCategory::Webhook);
    }

    #[test]
    fn node_without_id_is_declined() {
        let node = draft(json!({"operator_slug": "http"}));
        assert!(read_draft_node(&node, None).is_none());
    }

    #[test]
    fn version_node_reads_position_from_config() {
        let node: VersionNode = serde_json::from_value(json!({
            "node_id": "n1",
            "operator_slug": "send-email",
            "label": "Notify",
            "config": {"position": {"x": 3, "y": 4}, "to": "ops"},
        }))
        .unwrap();
        let node = read_version_node(&node).unwrap();
        assert_eq!(node.position, Position::new(3.0, 4.0));
        assert!(!node.data.config.contains_key("position"));
        assert_eq!(node.data.config_str("to"), Some("ops"));
        assert_eq!(node.data.icon, IconCategory::Email);

        assert!(read_version_node(&VersionNode::default()).is_none());
    }

    #[test]
    fn edge_reader_defaults_ports() {
        let edge = read_edge(&DraftEdge {
            id: Some(EdgeId::from("e1")),
            from: Some(EdgeEndpoint {
                node_id: Some(NodeId::from("a")),
                port: None,
            }),
            to: Some(EdgeEndpoint {
                node_id: Some(NodeId::from("b")),
                port: Some("input".to_string()),
            }),
            ..DraftEdge::default()
        })
        .unwrap();
        assert_eq!(edge.source_port, "out");
        assert_eq!(edge.target_port, "input");
    }

    #[test]
    fn edge_reader_accepts_legacy_keys() {
        let edge: DraftEdge = serde_json::from_value(json!({
            "source": "a",
            "target": "b",
            "sourceHandle": "true",
        }))
        .unwrap();
        let edge = read_edge(&edge).unwrap();
        assert_eq!(edge.source.as_str(), "a");
        assert_eq!(edge.source_port, "true");
        assert_eq!(edge.target_port, "in");
        assert!(edge.id.as_str().starts_with("edge_"));
    }

    #[test]
    fn edge_without_endpoint_is_declined() {
        let edge: DraftEdge = serde_json::from_value(json!({"from": {"node_id": "a"}})).unwrap();
        assert!(read_edge(&edge).is_none());
    }
}
