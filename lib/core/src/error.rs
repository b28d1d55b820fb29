//! Error handling foundation for flowdesk.
//!
//! This module provides only the `Result` type alias using rootcause.
//! Each crate defines its own domain-specific error types in their own
//! error modules, using rootcause's `.context()` to add layer-appropriate
//! context as errors propagate up the stack.

use rootcause::Report;

/// A Result type alias using rootcause's Report for error handling.
///
/// Each layer adds its own context via `.context()` as errors propagate.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeId;
    use std::fmt;

    #[derive(Debug)]
    struct MissingNode {
        node_id: NodeId,
    }

    impl fmt::Display for MissingNode {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "node not found: {}", self.node_id)
        }
    }

    impl std::error::Error for MissingNode {}

    fn find(known: &[NodeId], wanted: &str) -> Result<NodeId, MissingNode> {
        known
            .iter()
            .find(|id| id.as_str() == wanted)
            .cloned()
            .ok_or_else(|| {
                MissingNode {
                    node_id: NodeId::from(wanted),
                }
                .into()
            })
    }

    #[test]
    fn report_carries_the_domain_error() {
        let known = [NodeId::from("node_a")];
        assert_eq!(find(&known, "node_a").unwrap(), known[0]);

        let err = find(&known, "node_b").unwrap_err();
        assert!(err.to_string().contains("node not found: node_b"));
    }
}
