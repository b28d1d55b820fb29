//! Core types shared by the flowdesk crates.
//!
//! Provides the rootcause-based `Result` alias and the strongly-typed
//! identifiers used for nodes, edges and flows.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EdgeId, FlowId, NodeId};
