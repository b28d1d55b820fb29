//! Display icon categories derived from operator text.
//!
//! Icons are never persisted. They are re-derived on restore from the
//! operator's category or slug by keyword lookup.

use serde::{Deserialize, Serialize};

/// Icon category shown on a node tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IconCategory {
    Http,
    Email,
    Ai,
    Schedule,
    Webhook,
    Storage,
    Filter,
    Merge,
    /// Fallback for anything unrecognised.
    #[default]
    Code,
}

impl IconCategory {
    /// Returns the snake_case name of the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Email => "email",
            Self::Ai => "ai",
            Self::Schedule => "schedule",
            Self::Webhook => "webhook",
            Self::Storage => "storage",
            Self::Filter => "filter",
            Self::Merge => "merge",
            Self::Code => "code",
        }
    }
}

impl std::fmt::Display for IconCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Keyword table in priority order. The first keyword contained in the
/// lowercased text wins; "email" precedes "ai" because it contains it.
/// "ia" is the Spanish and French abbreviation for AI.
const KEYWORDS: &[(&str, IconCategory)] = &[
    ("http", IconCategory::Http),
    ("email", IconCategory::Email),
    ("ai", IconCategory::Ai),
    ("ia", IconCategory::Ai),
    ("llm", IconCategory::Ai),
    ("gpt", IconCategory::Ai),
    ("gemini", IconCategory::Ai),
    ("claude", IconCategory::Ai),
    ("generate", IconCategory::Ai),
    ("schedule", IconCategory::Schedule),
    ("webhook", IconCategory::Webhook),
    ("storage", IconCategory::Storage),
    ("db", IconCategory::Storage),
    ("filter", IconCategory::Filter),
    ("merge", IconCategory::Merge),
];

/// Derives the icon category for a category or slug string.
#[must_use]
pub fn icon_for(text: &str) -> IconCategory {
    let normalized = text.to_lowercase();
    KEYWORDS
        .iter()
        .find(|(keyword, _)| normalized.contains(keyword))
        .map_or(IconCategory::Code, |(_, category)| *category)
}
