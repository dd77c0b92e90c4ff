//! Graph error types
//!
//! Structural errors are returned at the call site and never corrected
//! silently. Unknown names and kinds are not errors (lookups return empty).

use std::fmt;

use crate::NodeKey;

/// Error type for node graph operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphError {
    /// Reparenting would make a node its own ancestor (or its own parent)
    InvalidHierarchy {
        node: NodeKey,
        parent: NodeKey,
    },
    /// A node was queued for both addition and removal in the same window
    ConcurrentMutation(NodeKey),
    /// The key does not refer to a node in the graph
    UnknownNode(NodeKey),
    /// `remove_child` was given a node that is not a child of `parent`
    NotAChild {
        parent: NodeKey,
        child: NodeKey,
    },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphError::InvalidHierarchy { node, parent } => {
                write!(f, "Invalid hierarchy: {:?} cannot be parented to {:?}", node, parent)
            }
            GraphError::ConcurrentMutation(key) => {
                write!(f, "Node {:?} queued for both addition and removal", key)
            }
            GraphError::UnknownNode(key) => write!(f, "Unknown node: {:?}", key),
            GraphError::NotAChild { parent, child } => {
                write!(f, "Node {:?} is not a child of {:?}", child, parent)
            }
        }
    }
}

impl std::error::Error for GraphError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_condition() {
        let key = NodeKey::default();
        let err = GraphError::InvalidHierarchy { node: key, parent: key };
        assert!(err.to_string().starts_with("Invalid hierarchy"));

        let err = GraphError::ConcurrentMutation(key);
        assert!(err.to_string().contains("addition and removal"));
    }
}
