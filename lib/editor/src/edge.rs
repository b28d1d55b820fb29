//! Edge types for flow graphs.
//!
//! Edges connect a port on one node to a port on another. Each edge specifies:
//! - The source node and its output port (`"out"` unless stated otherwise)
//! - The target node and its input port (`"in"` unless stated otherwise)

use flowdesk_core::{EdgeId, NodeId};
use serde::{Deserialize, Serialize};

/// Port used when an edge does not name its source port.
pub const DEFAULT_SOURCE_PORT: &str = "out";

/// Port used when an edge does not name its target port.
pub const DEFAULT_TARGET_PORT: &str = "in";

/// A directed edge from a source port to a target port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID.
    pub id: EdgeId,
    /// The source node ID.
    pub source: NodeId,
    /// The name of the output port on the source node.
    pub source_port: String,
    /// The target node ID.
    pub target: NodeId,
    /// The name of the input port on the target node.
    pub target_port: String,
}

impl Edge {
    /// Creates an edge using the default ports ("out" -> "in").
    #[must_use]
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self::with_ports(id, source, DEFAULT_SOURCE_PORT, target, DEFAULT_TARGET_PORT)
    }

    /// Creates an edge between named ports.
    #[must_use]
    pub fn with_ports(
        id: EdgeId,
        source: NodeId,
        source_port: impl Into<String>,
        target: NodeId,
        target_port: impl Into<String>,
    ) -> Self {
        Self {
            id,
            source,
            source_port: source_port.into(),
            target,
            target_port: target_port.into(),
        }
    }

    /// Creates an edge with a freshly generated ID and the default ports.
    #[must_use]
    pub fn connect(source: NodeId, target: NodeId) -> Self {
        Self::new(EdgeId::generate(), source, target)
    }

    /// Returns true if either endpoint is the given node.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_default_ports() {
        let edge = Edge::connect(NodeId::from("a"), NodeId::from("b"));
        assert_eq!(edge.source_port, "out");
        assert_eq!(edge.target_port, "in");
        assert!(edge.id.as_str().starts_with("edge_"));
    }

    #[test]
    fn edge_custom_ports() {
        let edge = Edge::with_ports(
            EdgeId::from("e1"),
            NodeId::from("a"),
            "severity",
            NodeId::from("b"),
            "in",
        );
        assert_eq!(edge.source_port, "severity");
        assert_eq!(edge.target_port, "in");
    }

    #[test]
    fn edge_touches_either_endpoint() {
        let edge = Edge::connect(NodeId::from("a"), NodeId::from("b"));
        assert!(edge.touches(&NodeId::from("a")));
        assert!(edge.touches(&NodeId::from("b")));
        assert!(!edge.touches(&NodeId::from("c")));
    }
}
