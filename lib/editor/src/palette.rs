//! Operator palette and the drag payload it hands to the canvas.

use crate::error::EditorError;
use crate::icon::{IconCategory, icon_for};
use rootcause::prelude::Report;
use serde::{Deserialize, Serialize};

/// Key under which a drag carries its serialized [`DragPayload`].
pub const DRAG_PAYLOAD_MIME: &str = "application/som-node-operator";

/// An operator or trigger offered by the backend catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Trigger type, used as the group key for triggers.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
}

/// Which catalog the palette shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogKind {
    /// Offered while the graph is empty.
    Triggers,
    Operators,
}

impl CatalogKind {
    /// Triggers for an empty graph, operators otherwise.
    #[must_use]
    pub const fn for_graph(is_empty: bool) -> Self {
        if is_empty { Self::Triggers } else { Self::Operators }
    }

    fn group_key(self, entry: &CatalogEntry) -> String {
        match self {
            Self::Triggers => entry.kind.clone().unwrap_or_else(|| "Trigger".to_string()),
            Self::Operators => entry
                .category
                .clone()
                .unwrap_or_else(|| "Uncategorized".to_string()),
        }
    }
}

/// Entries sharing a category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteGroup {
    /// Raw category key; becomes the payload category.
    pub id: String,
    /// Capitalised display title.
    pub title: String,
    pub icon: IconCategory,
    pub entries: Vec<CatalogEntry>,
}

/// Catalog entries grouped by category, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Palette {
    pub groups: Vec<PaletteGroup>,
}

impl Palette {
    #[must_use]
    pub fn build(kind: CatalogKind, entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut groups: Vec<PaletteGroup> = Vec::new();
        for entry in entries {
            let key = kind.group_key(&entry);
            match groups.iter_mut().find(|group| group.id == key) {
                Some(group) => group.entries.push(entry),
                None => groups.push(PaletteGroup {
                    title: capitalize(&key),
                    icon: icon_for(&key),
                    id: key,
                    entries: vec![entry],
                }),
            }
        }
        Self { groups }
    }

    /// Keeps entries whose name or description contains `term`, ignoring
    /// case, and drops groups left empty.
    #[must_use]
    pub fn filter(&self, term: &str) -> Self {
        let term = term.to_lowercase();
        let groups = self
            .groups
            .iter()
            .filter_map(|group| {
                let entries: Vec<CatalogEntry> = group
                    .entries
                    .iter()
                    .filter(|entry| {
                        entry.name.to_lowercase().contains(&term)
                            || entry
                                .description
                                .as_deref()
                                .is_some_and(|d| d.to_lowercase().contains(&term))
                    })
                    .cloned()
                    .collect();
                (!entries.is_empty()).then(|| PaletteGroup {
                    entries,
                    ..group.clone()
                })
            })
            .collect();
        Self { groups }
    }

    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.groups.iter().map(|group| group.entries.len()).sum()
    }
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The operator being dragged from the palette onto the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragPayload {
    #[serde(default)]
    pub operator_id: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DragPayload {
    /// Builds the payload for an entry of `group`.
    #[must_use]
    pub fn from_entry(group: &PaletteGroup, entry: &CatalogEntry) -> Self {
        Self {
            operator_id: Some(entry.id.clone()),
            label: Some(entry.name.clone()),
            category: Some(group.id.clone()),
            slug: entry.slug.clone(),
            description: entry.description.clone(),
        }
    }

    /// Serializes the payload for the drag data transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn encode(&self) -> Result<String, Report<EditorError>> {
        Ok(
            serde_json::to_string(self).map_err(|e| EditorError::Serialization {
                details: e.to_string(),
            })?,
        )
    }

    /// Parses a payload read from the drag data transfer.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` if `raw` is not a JSON object of the payload shape.
    pub fn decode(raw: &str) -> Result<Self, Report<EditorError>> {
        Ok(
            serde_json::from_str(raw).map_err(|e| EditorError::InvalidPayload {
                details: e.to_string(),
            })?,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, name: &str, category: Option<&str>, description: &str) -> CatalogEntry {
        CatalogEntry {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            category: category.map(str::to_string),
            kind: None,
            slug: Some(id.to_string()),
        }
    }

    fn operators() -> Palette {
        Palette::build(
            CatalogKind::Operators,
            vec![
                entry("http", "HTTP Request", Some("http"), "Call an API"),
                entry("gpt", "Summarize", Some("ai"), "Summarize text with an LLM"),
                entry("send", "Send Email", None, "Deliver a message"),
                entry("fetch", "Fetch Page", Some("http"), "Download a page"),
            ],
        )
    }

    #[test]
    fn groups_in_first_seen_order() {
        let palette = operators();
        let titles: Vec<&str> = palette.groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, vec!["Http", "Ai", "Uncategorized"]);
        assert_eq!(palette.groups[0].entries.len(), 2);
        assert_eq!(palette.groups[0].icon, IconCategory::Http);
        assert_eq!(palette.entry_count(), 4);
    }

    #[test]
    fn triggers_group_by_type() {
        let mut webhook = entry("wh", "Webhook", None, "");
        webhook.kind = Some("webhook".to_string());
        let palette = Palette::build(
            CatalogKind::Triggers,
            vec![webhook, entry("manual", "Manual", None, "")],
        );
        let ids: Vec<&str> = palette.groups.iter().map(|g| g.id.as_str()).collect();
        assert_eq!(ids, vec!["webhook", "Trigger"]);
    }

    #[test]
    fn filter_matches_name_or_description() {
        let palette = operators();
        let filtered = palette.filter("llm");
        assert_eq!(filtered.groups.len(), 1);
        assert_eq!(filtered.groups[0].entries[0].id, "gpt");

        let filtered = palette.filter("FETCH");
        assert_eq!(filtered.entry_count(), 1);
        assert!(palette.filter("nothing-matches").groups.is_empty());
        assert_eq!(palette.filter("").entry_count(), 4);
    }

    #[test]
    fn catalog_kind_depends_on_graph() {
        assert_eq!(CatalogKind::for_graph(true), CatalogKind::Triggers);
        assert_eq!(CatalogKind::for_graph(false), CatalogKind::Operators);
    }

    #[test]
    fn payload_uses_camel_case_keys() {
        let palette = operators();
        let group = &palette.groups[0];
        let payload = DragPayload::from_entry(group, &group.entries[0]);
        let raw = payload.encode().unwrap();
        assert!(raw.contains("\"operatorId\":\"http\""));
        assert_eq!(DragPayload::decode(&raw).unwrap(), payload);
    }

    #[test]
    fn malformed_payload_is_rejected() {
        assert!(DragPayload::decode("{not json").is_err());
        assert!(DragPayload::decode("[1, 2]").is_err());
    }
}
