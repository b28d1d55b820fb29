//! Error types for CLI commands.

use std::fmt;
use std::path::PathBuf;

/// Errors raised by a CLI command.
#[derive(Debug)]
pub enum CliError {
    /// A local file could not be read or written.
    Io { path: PathBuf, details: String },
    /// The editor operation failed (use as context wrapper).
    Command { command: &'static str },
    /// The requested version is not among the flow's versions.
    VersionNotFound { version: String },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, details } => write!(f, "{}: {details}", path.display()),
            Self::Command { command } => write!(f, "{command} failed"),
            Self::VersionNotFound { version } => write!(f, "version '{version}' not found"),
        }
    }
}

impl std::error::Error for CliError {}
