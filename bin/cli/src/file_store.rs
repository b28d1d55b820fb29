//! A [`FlowStore`] backed by JSON files.
//!
//! Layout under the store directory:
//!
//! ```text
//! flows/{flow_id}.json       one FlowDraft per flow
//! versions/{flow_id}.json    array of FlowVersion documents
//! ```

use async_trait::async_trait;
use chrono::Utc;
use flowdesk_core::FlowId;
use flowdesk_editor::document::{FlowDraft, FlowVersion};
use flowdesk_editor::error::StoreError;
use flowdesk_editor::store::FlowStore;
use rootcause::prelude::Report;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

pub struct FileFlowStore {
    root: PathBuf,
    /// Serializes read-modify-write cycles on version files.
    write_lock: Mutex<()>,
}

impl FileFlowStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn flow_path(&self, flow_id: &FlowId) -> Result<PathBuf, Report<StoreError>> {
        Ok(self
            .root
            .join("flows")
            .join(format!("{}.json", file_stem(flow_id)?)))
    }

    fn versions_path(&self, flow_id: &FlowId) -> Result<PathBuf, Report<StoreError>> {
        Ok(self
            .root
            .join("versions")
            .join(format!("{}.json", file_stem(flow_id)?)))
    }

    async fn read_versions(&self, flow_id: &FlowId) -> Result<Vec<FlowVersion>, Report<StoreError>> {
        let path = self.versions_path(flow_id)?;
        let Some(raw) = read_optional(&path).await? else {
            return Ok(Vec::new());
        };
        let values: Vec<Value> = serde_json::from_str(&raw).map_err(|e| invalid(&path, &e))?;

        let mut versions = Vec::with_capacity(values.len());
        for value in values {
            match FlowVersion::from_value(value) {
                Ok(version) => versions.push(version),
                Err(report) => {
                    tracing::warn!(path = %path.display(), error = %report, "Skipping unreadable version");
                }
            }
        }
        Ok(versions)
    }
}

/// Rejects ids that would escape the store directory.
fn file_stem(flow_id: &FlowId) -> Result<&str, Report<StoreError>> {
    let id = flow_id.as_str();
    if id.is_empty() || id.starts_with('.') || id.contains(['/', '\\']) {
        return Err(StoreError::InvalidDocument {
            details: format!("unusable flow id '{id}'"),
        }
        .into());
    }
    Ok(id)
}

fn invalid(path: &Path, error: &serde_json::Error) -> StoreError {
    StoreError::InvalidDocument {
        details: format!("{}: {error}", path.display()),
    }
}

fn unavailable(path: &Path, error: &std::io::Error) -> StoreError {
    StoreError::Unavailable {
        details: format!("{}: {error}", path.display()),
    }
}

async fn read_optional(path: &Path) -> Result<Option<String>, Report<StoreError>> {
    match fs::read_to_string(path).await {
        Ok(raw) => Ok(Some(raw)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(unavailable(path, &e).into()),
    }
}

async fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<(), Report<StoreError>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| unavailable(parent, &e))?;
    }
    let raw = serde_json::to_string_pretty(value).map_err(|e| invalid(path, &e))?;
    fs::write(path, raw).await.map_err(|e| unavailable(path, &e))?;
    Ok(())
}

fn now_value() -> Value {
    Value::String(Utc::now().to_rfc3339())
}

#[async_trait]
impl FlowStore for FileFlowStore {
    async fn fetch_flow(&self, flow_id: &FlowId) -> Result<FlowDraft, Report<StoreError>> {
        let path = self.flow_path(flow_id)?;
        let raw = read_optional(&path).await?.ok_or_else(|| StoreError::NotFound {
            flow_id: flow_id.clone(),
        })?;
        Ok(serde_json::from_str(&raw).map_err(|e| invalid(&path, &e))?)
    }

    async fn save_flow(&self, mut draft: FlowDraft) -> Result<FlowDraft, Report<StoreError>> {
        let _guard = self.write_lock.lock().await;
        let flow_id = match &draft.id {
            Some(id) => {
                if read_optional(&self.flow_path(id)?).await?.is_none() {
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

        let path = self.flow_path(&flow_id)?;
        write_json(&path, &draft).await?;
        tracing::debug!(flow_id = %flow_id, path = %path.display(), "Wrote flow");
        Ok(draft)
    }

    async fn list_versions(&self, flow_id: &FlowId) -> Result<Vec<FlowVersion>, Report<StoreError>> {
        self.read_versions(flow_id).await
    }

    async fn create_version(&self, mut version: FlowVersion) -> Result<FlowVersion, Report<StoreError>> {
        let Some(flow_id) = version.flow_definition_id.clone() else {
            return Err(StoreError::InvalidDocument {
                details: "version has no flow_definition_id".to_string(),
            }
            .into());
        };

        let _guard = self.write_lock.lock().await;
        let mut versions = self.read_versions(&flow_id).await?;
        if version.id.is_none() {
            version.id = Some(format!("version_{}", versions.len() + 1));
        }
        if version.created.is_none() {
            version.created = Some(now_value());
        }
        versions.push(version.clone());

        let path = self.versions_path(&flow_id)?;
        write_json(&path, &versions).await?;
        tracing::debug!(flow_id = %flow_id, count = versions.len(), "Wrote versions");
        Ok(version)
    }
}
