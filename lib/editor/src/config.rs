//! Editor configuration.
//!
//! Every field has a default, so an empty source deserializes to a working
//! configuration. Hosts embed [`EditorConfig`] in their own config and load
//! it through the `config` crate.

use serde::Deserialize;

/// Configuration for an editor session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EditorConfig {
    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub placement: PlacementConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Undo/redo configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undo entries.
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
}

fn default_history_capacity() -> usize {
    50
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
        }
    }
}

/// Node placement configuration, in canvas units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlacementConfig {
    /// Rendered node size. Drops are centred by subtracting half of it.
    #[serde(default = "default_node_size")]
    pub node_size: f64,

    /// Horizontal distance from a source node to an auto-connected node.
    #[serde(default = "default_auto_connect_offset")]
    pub auto_connect_offset: f64,

    /// Icon colour stored on dropped nodes.
    #[serde(default = "default_icon_color")]
    pub icon_color: String,
}

fn default_node_size() -> f64 {
    100.0
}

fn default_auto_connect_offset() -> f64 {
    250.0
}

fn default_icon_color() -> String {
    "#A78BFA".to_string()
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            node_size: default_node_size(),
            auto_connect_offset: default_auto_connect_offset(),
            icon_color: default_icon_color(),
        }
    }
}

/// File import configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportConfig {
    /// Gap between the rightmost existing node and imported content.
    #[serde(default = "default_import_margin")]
    pub margin: f64,
}

fn default_import_margin() -> f64 {
    300.0
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            margin: default_import_margin(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PersistenceConfig {
    /// Organization stamped on drafts that carry none.
    #[serde(default = "default_organization_id")]
    pub default_organization_id: String,

    /// Description given to published versions.
    #[serde(default = "default_publish_description")]
    pub publish_description: String,
}

fn default_organization_id() -> String {
    "org_default".to_string()
}

fn default_publish_description() -> String {
    "Published from Editor".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            default_organization_id: default_organization_id(),
            publish_description: default_publish_description(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editor_config_has_correct_defaults() {
        let config = EditorConfig::default();
        assert_eq!(config.history.capacity, 50);
        assert_eq!(config.placement.node_size, 100.0);
        assert_eq!(config.placement.auto_connect_offset, 250.0);
        assert_eq!(config.placement.icon_color, "#A78BFA");
        assert_eq!(config.import.margin, 300.0);
        assert_eq!(config.persistence.default_organization_id, "org_default");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: EditorConfig =
            serde_json::from_str(r#"{"history": {"capacity": 10}, "placement": {}}"#)
                .expect("deserialize");
        assert_eq!(config.history.capacity, 10);
        assert_eq!(config.placement, PlacementConfig::default());
        assert_eq!(config.import, ImportConfig::default());
    }
}
