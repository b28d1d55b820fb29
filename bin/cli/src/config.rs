//! CLI configuration.
//!
//! Loaded via the `config` crate from `FLOWDESK__*` environment variables,
//! e.g. `FLOWDESK__STORE_DIR` or `FLOWDESK__EDITOR__HISTORY__CAPACITY`.

use flowdesk_editor::EditorConfig;
use serde::Deserialize;
use std::path::PathBuf;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FLOWDESK";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    /// Directory holding the flow and version documents.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,

    /// Editor behaviour.
    #[serde(default)]
    pub editor: EditorConfig,
}

fn default_store_dir() -> PathBuf {
    PathBuf::from("flows")
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            editor: EditorConfig::default(),
        }
    }
}

impl CliConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(environment())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment)
            .build()?
            .try_deserialize()
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<CliConfig, config::ConfigError> {
        let source = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        CliConfig::from_environment(environment().source(Some(source)))
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config, CliConfig::default());
        assert_eq!(config.editor.history.capacity, 50);
    }

    #[test]
    fn nested_editor_settings_are_read() {
        let config = load(&[
            ("FLOWDESK__STORE_DIR", "/tmp/flows"),
            ("FLOWDESK__EDITOR__HISTORY__CAPACITY", "10"),
            ("FLOWDESK__EDITOR__IMPORT__MARGIN", "120"),
        ])
        .unwrap();
        assert_eq!(config.store_dir, PathBuf::from("/tmp/flows"));
        assert_eq!(config.editor.history.capacity, 10);
        assert!((config.editor.import.margin - 120.0).abs() < f64::EPSILON);
        assert!((config.editor.placement.node_size - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn invalid_value_is_rejected() {
        assert!(load(&[("FLOWDESK__EDITOR__HISTORY__CAPACITY", "many")]).is_err());
    }
}
