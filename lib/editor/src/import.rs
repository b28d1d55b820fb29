//! Additive import of a flow file into the live graph.
//!
//! Imported nodes get fresh ids and are shifted right of the existing
//! content. Triggers are left out, since a flow already has its own entry
//! point, and so is every edge that touched one.

use crate::config::ImportConfig;
use crate::document::{DraftNode, FlowDraft};
use crate::edge::Edge;
use crate::error::{EditorError, GraphError};
use crate::graph::FlowGraph;
use crate::node::{Node, looks_like_trigger};
use crate::schema::{read_draft_node, read_edge};
use flowdesk_core::{EdgeId, NodeId};
use rootcause::prelude::Report;
use serde_json::Value;
use std::collections::HashMap;

/// Nodes and edges ready to be appended to a graph.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImportOutcome {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub skipped_triggers: usize,
}

/// Parses an import file.
///
/// # Errors
///
/// Returns `InvalidImport` if the text is not JSON, not an object, or has no
/// `draft_nodes` list.
pub fn parse_import(raw: &str) -> Result<FlowDraft, Report<EditorError>> {
    let value: Value = serde_json::from_str(raw).map_err(|e| EditorError::InvalidImport {
        details: e.to_string(),
    })?;
    if !value.get("draft_nodes").is_some_and(Value::is_array) {
        return Err(EditorError::InvalidImport {
            details: "missing draft_nodes".to_string(),
        }
        .into());
    }
    Ok(
        serde_json::from_value(value).map_err(|e| EditorError::InvalidImport {
            details: e.to_string(),
        })?,
    )
}

/// Horizontal offset applied to imported positions.
#[must_use]
pub fn import_offset(graph: &FlowGraph, config: &ImportConfig) -> f64 {
    match graph.max_x() {
        Some(max_x) => max_x.max(0.0) + config.margin,
        None => 0.0,
    }
}

/// Re-keys and positions the content of `file` for appending to `graph`.
#[must_use]
pub fn plan_import(graph: &FlowGraph, file: &FlowDraft, config: &ImportConfig) -> ImportOutcome {
    let offset = import_offset(graph, config);
    let state = file.editor_state.as_ref();
    let mut id_map: HashMap<NodeId, NodeId> = HashMap::new();
    let mut outcome = ImportOutcome::default();

    for draft in &file.draft_nodes {
        if is_trigger(draft) {
            outcome.skipped_triggers += 1;
            continue;
        }
        let Some((mut node, _)) = read_draft_node(draft, state) else {
            tracing::warn!("Skipping imported node no schema reader accepts");
            continue;
        };
        let fresh = NodeId::generate();
        if draft.label.is_none() && draft.param_str("title").is_none() {
            // Untitled nodes are titled by id; keep that in step with the new id.
            node.data.title = fresh.to_string();
        }
        id_map.insert(node.id.clone(), fresh.clone());
        node.id = fresh;
        node.position = node.position.offset(offset, 0.0);
        node.selected = false;
        outcome.nodes.push(node);
    }

    for draft in &file.draft_edges {
        let Some(edge) = read_edge(draft) else {
            continue;
        };
        if let (Some(source), Some(target)) = (id_map.get(&edge.source), id_map.get(&edge.target)) {
            outcome.edges.push(Edge::with_ports(
                EdgeId::generate(),
                source.clone(),
                edge.source_port,
                target.clone(),
                edge.target_port,
            ));
        }
    }

    outcome
}

/// Returns a copy of `graph` with the outcome appended.
///
/// # Errors
///
/// Returns an error if an imported edge does not resolve; `graph` is not modified.
pub fn apply_import(graph: &FlowGraph, outcome: ImportOutcome) -> Result<FlowGraph, GraphError> {
    let mut next = graph.clone();
    for node in outcome.nodes {
        next.add_node(node)?;
    }
    for edge in outcome.edges {
        next.add_edge(edge)?;
    }
    Ok(next)
}

fn is_trigger(draft: &DraftNode) -> bool {
    let label = draft
        .label
        .as_deref()
        .or_else(|| draft.param_str("title"))
        .unwrap_or_default();
    let slug = draft
        .operator_slug
        .as_deref()
        .or(draft.node_type.as_deref())
        .or_else(|| draft.param_str("slug"))
        .unwrap_or_default();
    looks_like_trigger(label, slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{NodeData, Position};
    use serde_json::json;

    fn file() -> FlowDraft {
        parse_import(
            &json!({
                "draft_nodes": [
                    {"node_id": "t", "operator_slug": "webhook-trigger", "label": "On webhook"},
                    {"node_id": "a", "operator_slug": "http", "label": "Fetch"},
                    {"node_id": "b", "operator_slug": "code", "label": "Transform"},
                ],
                "draft_edges": [
                    {"id": "e0", "from": {"node_id": "t", "port": "out"}, "to": {"node_id": "a", "port": "in"}},
                    {"id": "e1", "from": {"node_id": "a", "port": "out"}, "to": {"node_id": "b", "port": "in"}},
                ],
                "editor_state": {"node_positions": {
                    "a": {"x": 0, "y": 10},
                    "b": {"x": 250, "y": 10},
                }},
            })
            .to_string(),
        )
        .unwrap()
    }

    fn existing() -> FlowGraph {
        let mut graph = FlowGraph::new();
        for (id, x) in [("a", 100.0), ("b", 400.0)] {
            graph
                .add_node(Node::new(NodeId::from(id), Position::new(x, 0.0), NodeData::new(id, "code")))
                .unwrap();
        }
        graph
    }

    #[test]
    fn rejects_malformed_files() {
        assert!(parse_import("{not json").is_err());
        assert!(parse_import("[]").is_err());
        assert!(parse_import(r#"{"name": "no nodes"}"#).is_err());
        assert!(parse_import(r#"{"draft_nodes": {}}"#).is_err());
        assert!(parse_import(r#"{"draft_nodes": []}"#).is_ok());
    }

    #[test]
    fn offset_is_zero_for_empty_graph() {
        assert_eq!(import_offset(&FlowGraph::new(), &ImportConfig::default()), 0.0);
        assert_eq!(import_offset(&existing(), &ImportConfig::default()), 700.0);
    }

    #[test]
    fn negative_positions_do_not_pull_offset_left() {
        let mut graph = FlowGraph::new();
        graph
            .add_node(Node::new(NodeId::from("n"), Position::new(-500.0, 0.0), NodeData::default()))
            .unwrap();
        assert_eq!(import_offset(&graph, &ImportConfig::default()), 300.0);
    }

    #[test]
    fn import_rekeys_and_skips_triggers() {
        let graph = existing();
        let outcome = plan_import(&graph, &file(), &ImportConfig::default());

        assert_eq!(outcome.skipped_triggers, 1);
        assert_eq!(outcome.nodes.len(), 2);
        assert_eq!(outcome.edges.len(), 1);
        for node in &outcome.nodes {
            assert!(!graph.contains_node(&node.id));
        }
        assert_eq!(outcome.nodes[0].position, Position::new(700.0, 10.0));
        assert_eq!(outcome.nodes[1].position, Position::new(950.0, 10.0));

        let edge = &outcome.edges[0];
        assert_eq!(edge.source, outcome.nodes[0].id);
        assert_eq!(edge.target, outcome.nodes[1].id);
        assert_ne!(edge.id.as_str(), "e1");

        let next = apply_import(&graph, outcome).unwrap();
        assert_eq!(next.node_count(), 4);
        assert_eq!(next.edge_count(), 1);
    }

    #[test]
    fn untitled_nodes_take_their_new_id_as_title() {
        let file: FlowDraft = serde_json::from_value(json!({
            "draft_nodes": [
                {"node_id": "old_1"},
                {"node_id": "old_2", "label": "Kept"},
            ],
        }))
        .unwrap();
        let outcome = plan_import(&FlowGraph::new(), &file, &ImportConfig::default());

        let untitled = &outcome.nodes[0];
        assert_eq!(untitled.data.title, untitled.id.to_string());
        assert_ne!(untitled.data.title, "old_1");
        assert_eq!(outcome.nodes[1].data.title, "Kept");
    }

    #[test]
    fn legacy_trigger_is_detected_from_params() {
        let draft: DraftNode =
            serde_json::from_value(json!({"id": "x", "params": {"title": "Cron Trigger"}})).unwrap();
        assert!(is_trigger(&draft));
        let draft: DraftNode = serde_json::from_value(json!({"node_id": "trigger_1"})).unwrap();
        assert!(!is_trigger(&draft));
    }
}
