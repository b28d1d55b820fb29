//! Graph-editing engine for flowdesk.
//!
//! This crate holds everything behind the flow canvas:
//!
//! - **Graph**: nodes, edges and structural mutations with referential integrity
//! - **History**: bounded undo/redo snapshots with single-snapshot drags
//! - **Placement**: free drops, auto-connect from a node and edge splits
//! - **Persistence**: live graph to and from drafts, versions and import files
//! - **Versions**: numbering, ordering and publish payloads
//! - **Editor**: the session tying these together behind a [`FlowStore`]

pub mod config;
pub mod document;
pub mod edge;
pub mod editor;
pub mod error;
pub mod graph;
pub mod history;
pub mod icon;
pub mod import;
pub mod mapper;
pub mod node;
pub mod notification;
pub mod palette;
pub mod placement;
pub mod schema;
pub mod shortcut;
pub mod store;
pub mod version;

pub use config::EditorConfig;
pub use document::{FlowDraft, FlowVersion, VersionGraph};
pub use edge::Edge;
pub use editor::{FlowEditor, FlowMetadata};
pub use error::{EditorError, GraphError, StoreError};
pub use graph::FlowGraph;
pub use history::History;
pub use icon::IconCategory;
pub use node::{ContractField, Node, NodeData, Position};
pub use notification::{Notification, NotificationLevel};
pub use palette::{CatalogEntry, CatalogKind, DragPayload, Palette};
pub use placement::{PendingConnection, Viewport};
pub use shortcut::{HistoryCommand, KeyPress};
pub use store::{FlowStore, InMemoryFlowStore};
