//! Placement of newly inserted nodes.
//!
//! A node enters the canvas in one of three ways:
//! - Free drop: centred on the pointer
//! - Auto-connect: to the right of a source node, wired `out -> in`
//! - Edge split: at the midpoint of an edge, which is replaced by two edges
//!
//! [`resolve`] picks the position and wiring; [`insert`] applies them to a
//! copy of the graph so the caller can swap the result in whole.

use crate::config::PlacementConfig;
use crate::edge::{DEFAULT_SOURCE_PORT, DEFAULT_TARGET_PORT, Edge};
use crate::error::GraphError;
use crate::graph::FlowGraph;
use crate::node::{Node, Position};
use flowdesk_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// What the next inserted node should attach to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingConnection {
    /// Plain drop, no wiring.
    #[default]
    None,
    /// Connect from the "add" affordance of a node.
    FromNode(NodeId),
    /// Insert into the middle of an edge.
    SplitEdge(EdgeId),
}

/// Canvas pan and zoom.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
        }
    }
}

impl Viewport {
    /// Converts a screen point to canvas coordinates.
    #[must_use]
    pub fn screen_to_canvas(&self, screen: Position) -> Position {
        let zoom = if self.zoom.is_finite() && self.zoom > 0.0 {
            self.zoom
        } else {
            1.0
        };
        Position::new((screen.x - self.pan_x) / zoom, (screen.y - self.pan_y) / zoom)
    }
}

/// Edges to create alongside an inserted node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wiring {
    None,
    /// Add `source:out -> new:in`.
    Connect { source: NodeId },
    /// Replace `edge` with `edge.source -> new -> edge.target`.
    Split { edge: Edge },
}

/// A resolved insertion point.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub position: Position,
    pub wiring: Wiring,
}

/// Computes where a new node goes and how it is wired.
///
/// `pointer` is in screen space. Any context that cannot be resolved against
/// `graph` falls back to a free drop with no wiring.
#[must_use]
pub fn resolve(
    graph: &FlowGraph,
    pending: &PendingConnection,
    pointer: Position,
    viewport: &Viewport,
    config: &PlacementConfig,
) -> Placement {
    let free_drop = || Placement {
        position: free_drop_position(pointer, viewport, config),
        wiring: Wiring::None,
    };

    match pending {
        PendingConnection::None => free_drop(),
        PendingConnection::FromNode(source_id) => match graph.node(source_id) {
            Some(source) => Placement {
                position: source.position.offset(config.auto_connect_offset, 0.0),
                wiring: Wiring::Connect {
                    source: source_id.clone(),
                },
            },
            None => {
                tracing::warn!(node_id = %source_id, "Auto-connect source not found, dropping freely");
                free_drop()
            }
        },
        PendingConnection::SplitEdge(edge_id) => {
            let endpoints = graph.edge(edge_id).and_then(|edge| {
                let source = graph.node(&edge.source)?;
                let target = graph.node(&edge.target)?;
                Some((edge, source, target))
            });
            match endpoints {
                Some((edge, source, target)) => Placement {
                    position: source.position.midpoint(&target.position),
                    wiring: Wiring::Split { edge: edge.clone() },
                },
                None => {
                    tracing::warn!(edge_id = %edge_id, "Split edge not resolvable, dropping freely");
                    free_drop()
                }
            }
        }
    }
}

/// Pointer position centred on the node and converted to canvas space.
#[must_use]
pub fn free_drop_position(pointer: Position, viewport: &Viewport, config: &PlacementConfig) -> Position {
    let half = config.node_size / 2.0;
    viewport.screen_to_canvas(pointer.offset(-half, -half))
}

/// Returns a copy of `graph` with `node` inserted at `placement`.
///
/// The new node becomes the only selected node.
///
/// # Errors
///
/// Returns an error if the node id already exists or the wiring refers to
/// nodes or edges missing from `graph`. `graph` is never modified.
pub fn insert(graph: &FlowGraph, mut node: Node, placement: &Placement) -> Result<FlowGraph, GraphError> {
    let mut next = graph.clone();
    let node_id = node.id.clone();
    node.position = placement.position;
    next.add_node(node)?;
    next.select_only(&node_id)?;

    match &placement.wiring {
        Wiring::None => {}
        Wiring::Connect { source } => {
            next.add_edge(Edge::with_ports(
                EdgeId::generate(),
                source.clone(),
                DEFAULT_SOURCE_PORT,
                node_id,
                DEFAULT_TARGET_PORT,
            ))?;
        }
        Wiring::Split { edge } => {
            next.delete_edge(&edge.id)?;
            next.add_edge(Edge::with_ports(
                EdgeId::generate(),
                edge.source.clone(),
                edge.source_port.clone(),
                node_id.clone(),
                DEFAULT_TARGET_PORT,
            ))?;
            next.add_edge(Edge::with_ports(
                EdgeId::generate(),
                node_id,
                DEFAULT_SOURCE_PORT,
                edge.target.clone(),
                edge.target_port.clone(),
            ))?;
        }
    }

    Ok(next)
}
