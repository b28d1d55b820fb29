//! Command-line host for the flowdesk editor.
//!
//! Drives [`flowdesk_editor::FlowEditor`] against a directory of JSON
//! documents, one subcommand per editor operation.

pub mod commands;
pub mod config;
pub mod error;
pub mod file_store;

pub use commands::{Command, run};
pub use config::CliConfig;
pub use error::CliError;
pub use file_store::FileFlowStore;
