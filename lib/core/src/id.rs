//! Strongly-typed ID types for graph entities.
//!
//! Persisted documents carry ids minted by other sessions, older schema
//! versions or hand-edited files, so ids are opaque strings. Fresh ids are
//! generated from a ULID (Universally Unique Lexicographically Sortable
//! Identifier) behind a short type prefix, which keeps them collision-safe
//! across imports and sortable by creation time.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use ulid::Ulid;

/// Macro to generate a strongly-typed string ID with a ULID generator.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generates a fresh, globally unique ID.
            #[must_use]
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, Ulid::new()))
            }

            /// Wraps an existing id string without validation.
            #[must_use]
            pub fn new(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Returns the prefix used for generated ids.
            #[must_use]
            pub const fn prefix() -> &'static str {
                $prefix
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(raw: String) -> Self {
                Self(raw)
            }
        }

        impl From<&str> for $name {
            fn from(raw: &str) -> Self {
                Self(raw.to_string())
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

define_id!(
    /// Unique identifier for a node within a flow graph.
    NodeId,
    "node"
);

define_id!(
    /// Unique identifier for an edge within a flow graph.
    EdgeId,
    "edge"
);

define_id!(
    /// Unique identifier for a persisted flow definition.
    FlowId,
    "flow"
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_prefix() {
        assert!(NodeId::generate().as_str().starts_with("node_"));
        assert!(EdgeId::generate().as_str().starts_with("edge_"));
        assert!(FlowId::generate().as_str().starts_with("flow_"));
    }

    #[test]
    fn generated_ids_are_distinct() {
        let ids: HashSet<NodeId> = (0..64).map(|_| NodeId::generate()).collect();
        assert_eq!(ids.len(), 64);
    }

    #[test]
    fn foreign_ids_are_kept_verbatim() {
        let id = NodeId::from("n1");
        assert_eq!(id.as_str(), "n1");
        assert_eq!(id.to_string(), "n1");
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = EdgeId::new("e-1");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"e-1\"");
        let parsed: EdgeId = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed, id);
    }

    #[test]
    fn id_lookup_by_str() {
        let mut set = HashSet::new();
        set.insert(NodeId::from("a"));
        assert!(set.contains("a"));
    }
}
