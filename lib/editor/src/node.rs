//! Node types for flow graphs.
//!
//! A node's data has three parts:
//! - Identity: title, operator slug and description
//! - Contract fields: typed operator metadata stored at the root of a persisted node
//! - Config: free-form operator configuration, everything else

use crate::icon::{IconCategory, icon_for};
use flowdesk_core::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Free-form JSON object.
pub type JsonMap = Map<String, Value>;

/// A point on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(&self, other: &Self) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Returns this position shifted by the given deltas.
    #[must_use]
    pub fn offset(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Reads a `{x, y}` object, returning `None` unless both are numbers.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        let x = value.get("x")?.as_f64()?;
        let y = value.get("y")?.as_f64()?;
        Some(Self::new(x, y))
    }

    #[must_use]
    pub fn to_value(&self) -> Value {
        serde_json::json!({ "x": self.x, "y": self.y })
    }
}

/// Operator contract metadata persisted at the root of a draft node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractField {
    OrganizationId,
    OperatorVersion,
    InputContract,
    OutputContract,
    Ports,
    Policies,
    TimeoutMs,
    RetryPolicy,
    WorkerPoolKey,
    PrimaryAgentProfileId,
    AgentProfileIds,
    PromptTemplateId,
    CognitiveToolIds,
    DatasourceId,
    MemoryStoreId,
    ConnectorId,
}

impl ContractField {
    /// Every contract field, in persisted order.
    pub const ALL: [Self; 16] = [
        Self::OrganizationId,
        Self::OperatorVersion,
        Self::InputContract,
        Self::OutputContract,
        Self::Ports,
        Self::Policies,
        Self::TimeoutMs,
        Self::RetryPolicy,
        Self::WorkerPoolKey,
        Self::PrimaryAgentProfileId,
        Self::AgentProfileIds,
        Self::PromptTemplateId,
        Self::CognitiveToolIds,
        Self::DatasourceId,
        Self::MemoryStoreId,
        Self::ConnectorId,
    ];

    /// Returns the persisted key of this field.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OrganizationId => "organization_id",
            Self::OperatorVersion => "operator_version",
            Self::InputContract => "input_contract",
            Self::OutputContract => "output_contract",
            Self::Ports => "ports",
            Self::Policies => "policies",
            Self::TimeoutMs => "timeout_ms",
            Self::RetryPolicy => "retry_policy",
            Self::WorkerPoolKey => "worker_pool_key",
            Self::PrimaryAgentProfileId => "primary_agent_profile_id",
            Self::AgentProfileIds => "agent_profile_ids",
            Self::PromptTemplateId => "prompt_template_id",
            Self::CognitiveToolIds => "cognitive_tool_ids",
            Self::DatasourceId => "datasource_id",
            Self::MemoryStoreId => "memory_store_id",
            Self::ConnectorId => "connector_id",
        }
    }

    /// Looks up a field by its persisted key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == key)
    }
}

/// Keys of [`NodeData`] that are not stored in `config`.
const IDENTITY_KEYS: [&str; 3] = ["title", "slug", "description"];

/// Editable data carried by a node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodeData {
    /// Display label.
    pub title: String,
    /// Operator identifier.
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Contract fields present on this node.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub contract: BTreeMap<ContractField, Value>,
    /// Operator configuration.
    #[serde(default)]
    pub config: JsonMap,
    /// Display icon, derived and never persisted.
    #[serde(skip)]
    pub icon: IconCategory,
}

impl NodeData {
    /// Creates node data with an icon derived from the slug.
    #[must_use]
    pub fn new(title: impl Into<String>, slug: impl Into<String>) -> Self {
        let slug = slug.into();
        Self {
            title: title.into(),
            icon: icon_for(&slug),
            slug,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.config.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_contract(mut self, field: ContractField, value: Value) -> Self {
        self.contract.insert(field, value);
        self
    }

    /// Shallow-merges a patch into this data.
    ///
    /// Identity keys update identity fields, contract keys update contract
    /// fields and every other key lands in `config`. A `null` value removes
    /// the key.
    pub fn apply_patch(&mut self, patch: &JsonMap) {
        for (key, value) in patch {
            if IDENTITY_KEYS.contains(&key.as_str()) {
                self.apply_identity(key, value);
            } else if let Some(field) = ContractField::from_key(key) {
                if value.is_null() {
                    self.contract.remove(&field);
                } else {
                    self.contract.insert(field, value.clone());
                }
            } else if value.is_null() {
                self.config.remove(key);
            } else {
                self.config.insert(key.clone(), value.clone());
            }
        }
    }

    fn apply_identity(&mut self, key: &str, value: &Value) {
        let text = match value {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        match key {
            "title" => {
                if let Some(text) = text {
                    self.title = text;
                }
            }
            "slug" => {
                if let Some(text) = text {
                    self.slug = text;
                }
            }
            _ => self.description = text,
        }
    }

    /// Returns a string config value.
    #[must_use]
    pub fn config_str(&self, key: &str) -> Option<&str> {
        self.config.get(key).and_then(Value::as_str)
    }
}

/// A node in a flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Unique node ID.
    pub id: NodeId,
    /// Canvas position.
    pub position: Position,
    pub data: NodeData,
    /// Selection state, not persisted.
    #[serde(skip)]
    pub selected: bool,
}

impl Node {
    #[must_use]
    pub fn new(id: NodeId, position: Position, data: NodeData) -> Self {
        Self {
            id,
            position,
            data,
            selected: false,
        }
    }

    /// Returns true if the label or slug marks this node as a trigger.
    #[must_use]
    pub fn looks_like_trigger(&self) -> bool {
        looks_like_trigger(&self.data.title, &self.data.slug)
    }
}

/// Returns true if a label or slug contains "trigger", ignoring case.
#[must_use]
pub fn looks_like_trigger(label: &str, slug: &str) -> bool {
    label.to_lowercase().contains("trigger") || slug.to_lowercase().contains("trigger")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> JsonMap {
        match value {
            Value::Object(map) => map,
            _ => panic!("patch must be an object"),
        }
    }

    #[test]
    fn position_midpoint_and_offset() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(500.0, 100.0);
        assert_eq!(a.midpoint(&b), Position::new(250.0, 50.0));
        assert_eq!(a.offset(250.0, 0.0), Position::new(250.0, 0.0));
        assert!(!Position::new(f64::NAN, 0.0).is_finite());
    }

    #[test]
    fn position_from_value_requires_numbers() {
        assert_eq!(
            Position::from_value(&json!({"x": 1, "y": 2.5})),
            Some(Position::new(1.0, 2.5))
        );
        assert_eq!(Position::from_value(&json!({"x": "1", "y": 2})), None);
        assert_eq!(Position::from_value(&json!(null)), None);
    }

    #[test]
    fn contract_field_keys_round_trip() {
        for field in ContractField::ALL {
            assert_eq!(ContractField::from_key(field.as_str()), Some(field));
        }
        assert_eq!(ContractField::from_key("subtitle"), None);
    }

    #[test]
    fn patch_routes_keys() {
        let mut data = NodeData::new("Fetch", "http-request");
        data.apply_patch(&patch(json!({
            "title": "Fetch users",
            "timeout_ms": 5000,
            "url": "https://example.com",
        })));

        assert_eq!(data.title, "Fetch users");
        assert_eq!(data.contract.get(&ContractField::TimeoutMs), Some(&json!(5000)));
        assert_eq!(data.config_str("url"), Some("https://example.com"));
        assert!(!data.config.contains_key("timeout_ms"));
    }

    #[test]
    fn patch_null_removes_keys() {
        let mut data = NodeData::new("Fetch", "http-request")
            .with_description("desc")
            .with_config("url", json!("x"))
            .with_contract(ContractField::Ports, json!([]));
        data.apply_patch(&patch(json!({
            "url": null,
            "ports": null,
            "description": null,
            "title": null,
        })));

        assert!(data.config.is_empty());
        assert!(data.contract.is_empty());
        assert_eq!(data.description, None);
        assert_eq!(data.title, "Fetch");
    }

    #[test]
    fn trigger_detection_ignores_case() {
        assert!(looks_like_trigger("Webhook Trigger", "webhook"));
        assert!(looks_like_trigger("Start", "schedule-TRIGGER"));
        assert!(!looks_like_trigger("Send", "email"));
    }

    #[test]
    fn icon_is_derived_from_slug() {
        assert_eq!(NodeData::new("x", "send-email").icon, IconCategory::Email);
    }
}
