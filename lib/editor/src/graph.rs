//! The live, editable flow graph.
//!
//! Nodes and edges are kept in insertion order so a saved document lists
//! them the way the user built them. Topology queries build a petgraph view
//! on demand.

use crate::edge::Edge;
use crate::error::GraphError;
use crate::node::{JsonMap, Node, Position};
use flowdesk_core::{EdgeId, NodeId};
use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A flow graph: ordered nodes plus the edges between them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowGraph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl FlowGraph {
    /// Creates a new empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a graph from restored parts.
    ///
    /// Later nodes with an already-seen id are skipped, and so is every edge
    /// whose source or target is missing.
    #[must_use]
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> Self {
        let mut seen = HashSet::new();
        let nodes: Vec<Node> = nodes
            .into_iter()
            .filter(|node| {
                let fresh = seen.insert(node.id.clone());
                if !fresh {
                    tracing::warn!(node_id = %node.id, "Skipping duplicate node");
                }
                fresh
            })
            .collect();

        let edges = edges
            .into_iter()
            .filter(|edge| {
                let valid = seen.contains(&edge.source) && seen.contains(&edge.target);
                if !valid {
                    tracing::warn!(
                        edge_id = %edge.id,
                        source = %edge.source,
                        target = %edge.target,
                        "Skipping edge with missing endpoint"
                    );
                }
                valid
            })
            .collect();

        Self { nodes, edges }
    }

    /// Returns all nodes in insertion order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Returns all edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|node| &node.id == node_id)
    }

    /// Returns an edge by its ID.
    #[must_use]
    pub fn edge(&self, edge_id: &EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| &edge.id == edge_id)
    }

    #[must_use]
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some()
    }

    fn node_mut(&mut self, node_id: &NodeId) -> Result<&mut Node, GraphError> {
        self.nodes
            .iter_mut()
            .find(|node| &node.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.clone(),
            })
    }

    /// Appends a node.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same ID exists or the position is
    /// not finite.
    pub fn add_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.contains_node(&node.id) {
            return Err(GraphError::DuplicateNode { node_id: node.id });
        }
        if !node.position.is_finite() {
            return Err(GraphError::InvalidPosition { node_id: node.id });
        }
        self.nodes.push(node);
        Ok(())
    }

    /// Removes a node and every edge touching it.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn delete_node(&mut self, node_id: &NodeId) -> Result<Node, GraphError> {
        let index = self
            .nodes
            .iter()
            .position(|node| &node.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: node_id.clone(),
            })?;
        let node = self.nodes.remove(index);
        self.edges.retain(|edge| !edge.touches(node_id));
        Ok(node)
    }

    /// Appends an edge. Parallel edges between the same ports are allowed.
    ///
    /// # Errors
    ///
    /// Returns an error if the source or target node does not exist.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains_node(endpoint) {
                return Err(GraphError::NodeNotFound {
                    node_id: endpoint.clone(),
                });
            }
        }
        self.edges.push(edge);
        Ok(())
    }

    /// Removes a single edge.
    ///
    /// # Errors
    ///
    /// Returns an error if the edge does not exist.
    pub fn delete_edge(&mut self, edge_id: &EdgeId) -> Result<Edge, GraphError> {
        let index = self
            .edges
            .iter()
            .position(|edge| &edge.id == edge_id)
            .ok_or_else(|| GraphError::EdgeNotFound {
                edge_id: edge_id.clone(),
            })?;
        Ok(self.edges.remove(index))
    }

    /// Shallow-merges a patch into a node's data.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn update_node_data(&mut self, node_id: &NodeId, patch: &JsonMap) -> Result<(), GraphError> {
        self.node_mut(node_id)?.data.apply_patch(patch);
        Ok(())
    }

    /// Replaces a node's position.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist or the position is not finite.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> Result<(), GraphError> {
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition {
                node_id: node_id.clone(),
            });
        }
        self.node_mut(node_id)?.position = position;
        Ok(())
    }

    /// Selects exactly one node, deselecting the rest.
    ///
    /// # Errors
    ///
    /// Returns an error if the node does not exist.
    pub fn select_only(&mut self, node_id: &NodeId) -> Result<(), GraphError> {
        if !self.contains_node(node_id) {
            return Err(GraphError::NodeNotFound {
                node_id: node_id.clone(),
            });
        }
        for node in &mut self.nodes {
            node.selected = &node.id == node_id;
        }
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for node in &mut self.nodes {
            node.selected = false;
        }
    }

    /// Returns the first selected node, if any.
    #[must_use]
    pub fn selected_node(&self) -> Option<&Node> {
        self.nodes.iter().find(|node| node.selected)
    }

    /// Returns the rightmost node x coordinate.
    #[must_use]
    pub fn max_x(&self) -> Option<f64> {
        self.nodes
            .iter()
            .map(|node| node.position.x)
            .reduce(f64::max)
    }

    /// Returns the targets of edges leaving a node, in edge order.
    #[must_use]
    pub fn successors(&self, node_id: &NodeId) -> Vec<NodeId> {
        self.topology().neighbors(node_id, Direction::Outgoing)
    }

    /// Returns the sources of edges entering a node, in edge order.
    #[must_use]
    pub fn predecessors(&self, node_id: &NodeId) -> Vec<NodeId> {
        self.topology().neighbors(node_id, Direction::Incoming)
    }

    /// Returns nodes with no outgoing edge on the given port.
    ///
    /// These are the nodes that offer an "add next step" affordance.
    #[must_use]
    pub fn nodes_without_outgoing(&self, port: &str) -> Vec<NodeId> {
        let topology = self.topology();
        topology
            .graph
            .node_indices()
            .filter(|&idx| {
                !topology
                    .graph
                    .edges_directed(idx, Direction::Outgoing)
                    .any(|edge| edge.weight().source_port == port)
            })
            .map(|idx| topology.graph[idx].clone())
            .collect()
    }

    fn topology(&self) -> Topology<'_> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let mut node_index_map = HashMap::with_capacity(self.nodes.len());
        for node in &self.nodes {
            let index = graph.add_node(&node.id);
            node_index_map.insert(&node.id, index);
        }
        for edge in &self.edges {
            if let (Some(&source), Some(&target)) = (
                node_index_map.get(&edge.source),
                node_index_map.get(&edge.target),
            ) {
                graph.add_edge(source, target, edge);
            }
        }
        Topology {
            graph,
            node_index_map,
        }
    }
}

/// Borrowed petgraph view of a [`FlowGraph`].
struct Topology<'a> {
    graph: DiGraph<&'a NodeId, &'a Edge>,
    node_index_map: HashMap<&'a NodeId, NodeIndex>,
}

impl Topology<'_> {
    fn neighbors(&self, node_id: &NodeId, direction: Direction) -> Vec<NodeId> {
        let Some(&index) = self.node_index_map.get(node_id) else {
            return Vec::new();
        };
        // petgraph walks edges newest first.
        let mut neighbors: Vec<NodeId> = self
            .graph
            .edges_directed(index, direction)
            .map(|edge| match direction {
                Direction::Outgoing => self.graph[edge.target()].clone(),
                Direction::Incoming => self.graph[edge.source()].clone(),
            })
            .collect();
        neighbors.reverse();
        neighbors
    }
}
