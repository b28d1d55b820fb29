//! Persisted flow documents.
//!
//! Documents are read leniently: every field is optional, so drafts written
//! by older editors still parse and the schema readers decide what to keep.
//! Unknown top-level fields survive a load/save round trip untouched.

use crate::error::EditorError;
use crate::node::{JsonMap, Position};
use crate::placement::Viewport;
use flowdesk_core::{EdgeId, FlowId, NodeId};
use rootcause::prelude::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A mutable flow definition as stored by the backend.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FlowId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_ids: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_trigger_id: Option<Value>,
    #[serde(default, deserialize_with = "skip_unreadable")]
    pub draft_nodes: Vec<DraftNode>,
    #[serde(default, deserialize_with = "skip_unreadable")]
    pub draft_edges: Vec<DraftEdge>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor_state: Option<EditorState>,
    /// Backend fields this editor does not interpret.
    #[serde(flatten)]
    pub extra: JsonMap,
}

/// Backend timestamp keys cleared when a draft is duplicated.
pub const TIMESTAMP_KEYS: [&str; 4] = ["created", "updated", "created_at", "updated_at"];

impl FlowDraft {
    /// Creates an unsaved draft.
    #[must_use]
    pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slug: slug.into(),
            ..Self::default()
        }
    }

    /// Parses a draft from JSON text.
    ///
    /// # Errors
    ///
    /// Returns `InvalidImport` if the text is not a draft document.
    pub fn from_json(raw: &str) -> Result<Self, Report<EditorError>> {
        Ok(
            serde_json::from_str(raw).map_err(|e| EditorError::InvalidImport {
                details: e.to_string(),
            })?,
        )
    }

    /// Serializes the draft as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_pretty_json(&self) -> Result<String, Report<EditorError>> {
        Ok(
            serde_json::to_string_pretty(self).map_err(|e| EditorError::Serialization {
                details: e.to_string(),
            })?,
        )
    }
}

/// A node as stored in a draft, in any schema generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DraftNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<NodeId>,
    /// Legacy id key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_slug: Option<String>,
    /// Legacy slug key.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonMap>,
    /// Legacy bag holding config, title, slug and position together.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonMap>,
    /// Contract fields and anything else stored at the node root.
    #[serde(flatten)]
    pub root: JsonMap,
}

impl DraftNode {
    /// Returns a string from the legacy `params` bag.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.as_ref()?.get(key)?.as_str()
    }
}

/// One end of a persisted edge.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EdgeEndpoint {
    #[serde(default)]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,
}

/// A persisted edge. `from`/`to` are current; `source`/`target` are legacy.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DraftEdge {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EdgeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<EdgeEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<EdgeEndpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<NodeId>,
    #[serde(default, rename = "sourceHandle", skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, rename = "targetHandle", skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<String>,
}

/// Canvas state saved with a draft.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EditorState {
    #[serde(default)]
    pub zoom: Option<Value>,
    #[serde(default)]
    pub pan_x: Option<Value>,
    #[serde(default)]
    pub pan_y: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub node_positions: BTreeMap<NodeId, Value>,
}

impl EditorState {
    #[must_use]
    pub fn new(viewport: &Viewport, node_positions: BTreeMap<NodeId, Value>) -> Self {
        Self {
            zoom: Some(viewport.zoom.into()),
            pan_x: Some(viewport.pan_x.into()),
            pan_y: Some(viewport.pan_y.into()),
            node_positions,
        }
    }

    /// Returns the saved viewport when zoom and both pans are numbers.
    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        let number = |value: &Option<Value>| value.as_ref().and_then(Value::as_f64);
        Some(Viewport {
            zoom: number(&self.zoom)?,
            pan_x: number(&self.pan_x)?,
            pan_y: number(&self.pan_y)?,
        })
    }

    /// Returns the saved position of a node.
    #[must_use]
    pub fn position_of(&self, node_id: &NodeId) -> Option<Position> {
        Position::from_value(self.node_positions.get(node_id)?)
    }
}

/// An immutable, numbered snapshot of a flow.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FlowVersion {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Positive integer, string-encoded.
    #[serde(default, deserialize_with = "string_or_number")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_definition_id: Option<FlowId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flow_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graph: Option<VersionGraph>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_ids: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_trigger_id: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_default: bool,
    /// RFC 3339 string, epoch milliseconds or `{timestamp: ...}`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<Value>,
    #[serde(flatten)]
    pub extra: JsonMap,
}

impl FlowVersion {
    /// Parses a version document, stripping `_value` wrappers first.
    ///
    /// # Errors
    ///
    /// Returns `InvalidVersion` if the unwrapped value is not a version document.
    pub fn from_value(value: Value) -> Result<Self, Report<EditorError>> {
        Ok(
            serde_json::from_value(unwrap_value_wrappers(value)).map_err(|e| {
                EditorError::InvalidVersion {
                    details: e.to_string(),
                }
            })?,
        )
    }
}

/// Graph embedded in a version.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionGraph {
    #[serde(default, deserialize_with = "skip_unreadable")]
    pub nodes: Vec<VersionNode>,
    #[serde(default, deserialize_with = "skip_unreadable")]
    pub edges: Vec<DraftEdge>,
}

/// Minimal node shape used in versions. The position lives in `config.position`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionNode {
    #[serde(default)]
    pub node_id: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub config: JsonMap,
}

/// Recursively replaces every `{"_value": x}` wrapper with `x`.
///
/// Any object carrying a `_value` key collapses to that value.
#[must_use]
pub fn unwrap_value_wrappers(value: Value) -> Value {
    match value {
        Value::Object(mut map) => match map.remove("_value") {
            Some(inner) => unwrap_value_wrappers(inner),
            None => Value::Object(
                map.into_iter()
                    .map(|(key, value)| (key, unwrap_value_wrappers(value)))
                    .collect(),
            ),
        },
        Value::Array(items) => Value::Array(items.into_iter().map(unwrap_value_wrappers).collect()),
        other => other,
    }
}

/// Reads `null` as the type's default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads a list element by element, dropping elements that do not parse.
///
/// `null` reads as an empty list.
fn skip_unreadable<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .enumerate()
        .filter_map(|(index, item)| match serde_json::from_value(item) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!(index, error = %e, "Skipping unreadable list element");
                None
            }
        })
        .collect())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}
