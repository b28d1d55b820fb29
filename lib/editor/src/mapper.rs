//! Mapping between the live graph and persisted documents.

use crate::config::PersistenceConfig;
use crate::document::{
    DraftEdge, DraftNode, EdgeEndpoint, EditorState, FlowDraft, FlowVersion, VersionGraph,
    VersionNode,
};
use crate::edge::Edge;
use crate::error::EditorError;
use crate::graph::FlowGraph;
use crate::node::{ContractField, JsonMap, Node};
use crate::placement::Viewport;
use crate::schema::{read_draft_node, read_edge, read_version_node};
use rootcause::prelude::Report;
use serde_json::Value;
use std::collections::BTreeMap;

/// Slug written for a node whose slug is empty.
pub const UNKNOWN_SLUG: &str = "unknown";

/// A graph rebuilt from a draft, with the canvas state saved alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct RestoredGraph {
    pub graph: FlowGraph,
    /// Present when the draft saved a complete viewport.
    pub viewport: Option<Viewport>,
    /// Draft nodes no schema reader accepted.
    pub skipped_nodes: usize,
}

/// Serializes the live graph into a draft.
///
/// Metadata and unknown fields of `base` are kept. A missing organization
/// is filled from `config`.
#[must_use]
pub fn draft_from_graph(
    graph: &FlowGraph,
    viewport: &Viewport,
    base: &FlowDraft,
    config: &PersistenceConfig,
) -> FlowDraft {
    let node_positions: BTreeMap<_, Value> = graph
        .nodes()
        .iter()
        .map(|node| (node.id.clone(), node.position.to_value()))
        .collect();

    let mut draft = base.clone();
    draft.draft_nodes = graph.nodes().iter().map(draft_node).collect();
    draft.draft_edges = graph.edges().iter().map(draft_edge).collect();
    draft.editor_state = Some(EditorState::new(viewport, node_positions));
    if draft.organization_id.as_deref().is_none_or(str::is_empty) {
        draft.organization_id = Some(config.default_organization_id.clone());
    }
    draft
}

fn draft_node(node: &Node) -> DraftNode {
    let mut root = JsonMap::new();
    for field in ContractField::ALL {
        if let Some(value) = node.data.contract.get(&field) {
            root.insert(field.as_str().to_string(), value.clone());
        }
    }
    root.entry(ContractField::Ports.as_str())
        .or_insert_with(|| Value::Array(Vec::new()));

    DraftNode {
        node_id: Some(node.id.clone()),
        operator_slug: Some(slug_or_unknown(node)),
        label: Some(label_or_id(node)),
        description: node.data.description.clone(),
        config: Some(node.data.config.clone()),
        root,
        ..DraftNode::default()
    }
}

fn draft_edge(edge: &Edge) -> DraftEdge {
    DraftEdge {
        id: Some(edge.id.clone()),
        from: Some(EdgeEndpoint {
            node_id: Some(edge.source.clone()),
            port: Some(edge.source_port.clone()),
        }),
        to: Some(EdgeEndpoint {
            node_id: Some(edge.target.clone()),
            port: Some(edge.target_port.clone()),
        }),
        ..DraftEdge::default()
    }
}

fn slug_or_unknown(node: &Node) -> String {
    if node.data.slug.is_empty() {
        UNKNOWN_SLUG.to_string()
    } else {
        node.data.slug.clone()
    }
}

fn label_or_id(node: &Node) -> String {
    if node.data.title.is_empty() {
        node.id.to_string()
    } else {
        node.data.title.clone()
    }
}

/// Rebuilds the live graph from a draft.
///
/// Nodes no reader accepts and edges with a missing endpoint are skipped
/// with a warning.
#[must_use]
pub fn graph_from_draft(draft: &FlowDraft) -> RestoredGraph {
    let state = draft.editor_state.as_ref();
    let mut skipped_nodes = 0;
    let mut nodes = Vec::with_capacity(draft.draft_nodes.len());
    for (index, draft_node) in draft.draft_nodes.iter().enumerate() {
        match read_draft_node(draft_node, state) {
            Some((node, reader)) => {
                tracing::trace!(node_id = %node.id, reader, "Read draft node");
                nodes.push(node);
            }
            None => {
                tracing::warn!(index, "Skipping draft node no schema reader accepts");
                skipped_nodes += 1;
            }
        }
    }

    RestoredGraph {
        graph: FlowGraph::from_parts(nodes, read_edges(&draft.draft_edges)),
        viewport: state.and_then(EditorState::viewport),
        skipped_nodes,
    }
}

fn read_edges(edges: &[DraftEdge]) -> Vec<Edge> {
    edges
        .iter()
        .enumerate()
        .filter_map(|(index, edge)| {
            let read = read_edge(edge);
            if read.is_none() {
                tracing::warn!(index, "Skipping edge without both endpoints");
            }
            read
        })
        .collect()
}

/// Serializes the live graph into the minimal version shape.
///
/// Positions move into `config.position`; contract fields and descriptions
/// are not part of a version.
#[must_use]
pub fn version_graph_from_graph(graph: &FlowGraph) -> VersionGraph {
    let nodes = graph
        .nodes()
        .iter()
        .map(|node| {
            let mut config = node.data.config.clone();
            config.insert("position".to_string(), node.position.to_value());
            VersionNode {
                node_id: Some(node.id.clone()),
                operator_slug: Some(slug_or_unknown(node)),
                label: Some(label_or_id(node)),
                config,
            }
        })
        .collect();

    VersionGraph {
        nodes,
        edges: graph.edges().iter().map(draft_edge).collect(),
    }
}

/// Rebuilds a live graph from a published version.
///
/// # Errors
///
/// Returns `InvalidVersion` if the version carries no graph.
pub fn graph_from_version(version: &FlowVersion) -> Result<FlowGraph, Report<EditorError>> {
    let Some(version_graph) = &version.graph else {
        return Err(EditorError::InvalidVersion {
            details: "version has no graph".to_string(),
        }
        .into());
    };

    let nodes = version_graph
        .nodes
        .iter()
        .enumerate()
        .filter_map(|(index, node)| {
            let read = read_version_node(node);
            if read.is_none() {
                tracing::warn!(index, "Skipping version node without node_id");
            }
            read
        })
        .collect();

    Ok(FlowGraph::from_parts(nodes, read_edges(&version_graph.edges)))
}
