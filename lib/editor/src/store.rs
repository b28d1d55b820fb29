//! Flow storage boundary.

use crate::document::{FlowDraft, FlowVersion};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use flowdesk_core::FlowId;
use rootcause::prelude::Report;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

/// Persistence for flow drafts and their published versions.
///
/// Every call is a single request with no retry.
#[async_trait]
pub trait FlowStore: Send + Sync {
    /// Fetches a draft by ID.
    async fn fetch_flow(&self, flow_id: &FlowId) -> Result<FlowDraft, Report<StoreError>>;

    /// Creates the draft when it has no ID, updates it otherwise.
    ///
    /// Returns the canonical stored document.
    async fn save_flow(&self, draft: FlowDraft) -> Result<FlowDraft, Report<StoreError>>;

    /// Lists every version of a flow, in no particular order.
    async fn list_versions(&self, flow_id: &FlowId) -> Result<Vec<FlowVersion>, Report<StoreError>>;

    /// Stores a new immutable version.
    async fn create_version(&self, version: FlowVersion) -> Result<FlowVersion, Report<StoreError>>;
}

#[derive(Debug, Default)]
struct StoreState {
    flows: HashMap<FlowId, FlowDraft>,
    versions: Vec<FlowVersion>,
}

/// In-memory [`FlowStore`], shareable across clones.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFlowStore {
    state: Arc<Mutex<StoreState>>,
    unavailable: Arc<AtomicBool>,
}

impl InMemoryFlowStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `Unavailable` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of stored versions across all flows.
    pub async fn version_count(&self) -> usize {
        self.state.lock().await.versions.len()
    }

    fn check_available(&self) -> Result<(), Report<StoreError>> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable {
                details: "store marked unavailable".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl FlowStore for InMemoryFlowStore {
    async fn fetch_flow(&self, flow_id: &FlowId) -> Result<FlowDraft, Report<StoreError>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .flows
            .get(flow_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                flow_id: flow_id.clone(),
            })?)
    }

    async fn save_flow(&self, mut draft: FlowDraft) -> Result<FlowDraft, Report<StoreError>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        let flow_id = match &draft.id {
            Some(id) => {
                if !state.flows.contains_key(id) {
                    return Err(StoreError::NotFound { flow_id: id.clone() }.into());
                }
                id.clone()
            }
            None => {
                let id = FlowId::generate();
                draft.id = Some(id.clone());
                draft.extra.insert("created".to_string(), now_value());
                id
            }
        };
        draft.extra.insert("updated".to_string(), now_value());
        state.flows.insert(flow_id, draft.clone());
        Ok(draft)
    }

    async fn list_versions(&self, flow_id: &FlowId) -> Result<Vec<FlowVersion>, Report<StoreError>> {
        self.check_available()?;
        let state = self.state.lock().await;
        Ok(state
            .versions
            .iter()
            .filter(|version| version.flow_definition_id.as_ref() == Some(flow_id))
            .cloned()
            .collect())
    }

    async fn create_version(&self, mut version: FlowVersion) -> Result<FlowVersion, Report<StoreError>> {
        self.check_available()?;
        let mut state = self.state.lock().await;
        if version.id.is_none() {
            version.id = Some(format!("version_{}", state.versions.len() + 1));
        }
        if version.created.is_none() {
            version.created = Some(now_value());
        }
        state.versions.push(version.clone());
        Ok(version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_assigns_id_then_updates() {
        let store = InMemoryFlowStore::new();
        let saved = store.save_flow(FlowDraft::new("Flow", "flow")).await.unwrap();
        let id = saved.id.clone().unwrap();
        assert!(saved.extra.contains_key("created"));

        let mut renamed = saved.clone();
        renamed.name = "Renamed".to_string();
        store.save_flow(renamed).await.unwrap();

        let fetched = store.fetch_flow(&id).await.unwrap();
        assert_eq!(fetched.name, "Renamed");
    }

    #[tokio::test]
    async fn update_of_unknown_flow_fails() {
        let store = InMemoryFlowStore::new();
        let mut draft = FlowDraft::new("Flow", "flow");
        draft.id = Some(FlowId::from("flow_missing"));
        assert!(store.save_flow(draft).await.is_err());
        assert!(store.fetch_flow(&FlowId::from("flow_missing")).await.is_err());
    }

    #[tokio::test]
    async fn versions_are_listed_per_flow() {
        let store = InMemoryFlowStore::new();
        for flow in ["flow_a", "flow_a", "flow_b"] {
            store
                .create_version(FlowVersion {
                    flow_definition_id: Some(FlowId::from(flow)),
                    ..FlowVersion::default()
                })
                .await
                .unwrap();
        }
        let versions = store.list_versions(&FlowId::from("flow_a")).await.unwrap();
        assert_eq!(versions.len(), 2);
        assert!(versions.iter().all(|v| v.created.is_some()));
        assert_eq!(store.version_count().await, 3);
    }

    #[tokio::test]
    async fn unavailable_store_rejects_calls() {
        let store = InMemoryFlowStore::new();
        store.set_unavailable(true);
        let err = store.save_flow(FlowDraft::default()).await.unwrap_err();
        assert!(err.to_string().contains("unavailable"));

        store.set_unavailable(false);
        assert!(store.save_flow(FlowDraft::default()).await.is_ok());
    }
}
