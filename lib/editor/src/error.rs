//! Error types for the editor crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `GraphError`: Low-level graph operations (nodes, edges, patches)
//! - `StoreError`: Failures reported by a [`FlowStore`](crate::store::FlowStore)
//! - `EditorError`: Editor operations (save, publish, restore, import), wrapping
//!   lower errors via context

use flowdesk_core::{EdgeId, FlowId, NodeId};
use std::fmt;

/// Errors from graph operations.
///
/// These errors contain only information available at the graph layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID was not found in the graph.
    NodeNotFound { node_id: NodeId },
    /// Edge with the given ID was not found in the graph.
    EdgeNotFound { edge_id: EdgeId },
    /// A node with the same ID already exists.
    DuplicateNode { node_id: NodeId },
    /// A position had a NaN or infinite coordinate.
    InvalidPosition { node_id: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::EdgeNotFound { edge_id } => write!(f, "edge not found: {edge_id}"),
            Self::DuplicateNode { node_id } => write!(f, "duplicate node id: {node_id}"),
            Self::InvalidPosition { node_id } => {
                write!(f, "position of node {node_id} must be finite")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors from flow storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The flow does not exist.
    NotFound { flow_id: FlowId },
    /// The stored document could not be read or written.
    InvalidDocument { details: String },
    /// The backing service failed.
    Unavailable { details: String },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { flow_id } => write!(f, "flow not found: {flow_id}"),
            Self::InvalidDocument { details } => write!(f, "invalid flow document: {details}"),
            Self::Unavailable { details } => write!(f, "flow store unavailable: {details}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Errors at the editor operation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    /// A save or publish is in flight; edits are rejected until it completes.
    Busy,
    /// Graph operation failed.
    Graph { source: GraphError },
    /// Publishing requires at least one node.
    EmptyGraph,
    /// The flow has no persisted id yet.
    UnsavedFlow,
    /// A drag payload could not be decoded.
    InvalidPayload { details: String },
    /// An import file was malformed.
    InvalidImport { details: String },
    /// A version document was malformed.
    InvalidVersion { details: String },
    /// A document could not be serialized.
    Serialization { details: String },
    /// Loading the flow failed (use as context wrapper).
    LoadFailed { flow_id: FlowId },
    /// Saving the flow failed (use as context wrapper).
    SaveFailed,
    /// Listing versions failed (use as context wrapper).
    VersionListFailed { flow_id: FlowId },
    /// Creating the version failed (use as context wrapper).
    PublishFailed { version: u64 },
}

impl EditorError {
    /// Message suitable for a user-facing notification.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Busy => "A save is in progress".to_string(),
            Self::Graph { .. } => "The graph could not be updated".to_string(),
            Self::EmptyGraph => "Cannot publish empty flow (no nodes detected)".to_string(),
            Self::UnsavedFlow => "Cannot publish unsaved flow".to_string(),
            Self::InvalidPayload { .. } => "Invalid node operator payload".to_string(),
            Self::InvalidImport { .. } => "Invalid flow file".to_string(),
            Self::InvalidVersion { .. } => "Invalid version data".to_string(),
            Self::Serialization { .. } => "The flow could not be serialized".to_string(),
            Self::LoadFailed { .. } => "Error loading flow definition".to_string(),
            Self::SaveFailed => "Error saving flow".to_string(),
            Self::VersionListFailed { .. } => "Error fetching versions".to_string(),
            Self::PublishFailed { .. } => "Error publishing flow".to_string(),
        }
    }

    /// Returns true for errors caused by invalid input rather than a failing service.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyGraph
                | Self::UnsavedFlow
                | Self::InvalidPayload { .. }
                | Self::InvalidImport { .. }
                | Self::InvalidVersion { .. }
        )
    }
}

impl fmt::Display for EditorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Busy => write!(f, "editor is busy saving"),
            Self::Graph { source } => write!(f, "graph operation failed: {source}"),
            Self::EmptyGraph => write!(f, "cannot publish a flow without nodes"),
            Self::UnsavedFlow => write!(f, "flow has not been saved"),
            Self::InvalidPayload { details } => write!(f, "invalid drag payload: {details}"),
            Self::InvalidImport { details } => write!(f, "invalid import file: {details}"),
            Self::InvalidVersion { details } => write!(f, "invalid version document: {details}"),
            Self::Serialization { details } => write!(f, "serialization failed: {details}"),
            Self::LoadFailed { flow_id } => write!(f, "failed to load flow {flow_id}"),
            Self::SaveFailed => write!(f, "failed to save flow"),
            Self::VersionListFailed { flow_id } => {
                write!(f, "failed to list versions of flow {flow_id}")
            }
            Self::PublishFailed { version } => write!(f, "failed to publish version {version}"),
        }
    }
}

impl std::error::Error for EditorError {}

impl From<GraphError> for EditorError {
    fn from(source: GraphError) -> Self {
        Self::Graph { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let err = GraphError::NodeNotFound {
            node_id: NodeId::from("n1"),
        };
        assert_eq!(err.to_string(), "node not found: n1");
    }

    #[test]
    fn editor_error_wraps_graph_error() {
        let err = EditorError::from(GraphError::EdgeNotFound {
            edge_id: EdgeId::from("e1"),
        });
        assert!(err.to_string().contains("edge not found: e1"));
        assert!(!err.is_validation());
    }

    #[test]
    fn validation_errors_are_classified() {
        assert!(EditorError::EmptyGraph.is_validation());
        assert!(
            EditorError::InvalidImport {
                details: "eof".to_string()
            }
            .is_validation()
        );
        assert!(!EditorError::SaveFailed.is_validation());
    }

    #[test]
    fn store_error_display() {
        let err = StoreError::NotFound {
            flow_id: FlowId::from("flow_1"),
        };
        assert!(err.to_string().contains("flow not found"));
    }
}
