//! Engine error types

use std::fmt;

use thiserror::Error;

use super::path::Path;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum GraphError {
    #[error("Cannot construct an empty instance of {type_name}: no constructor registered")]
    Construction { type_name: &'static str },

    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Length mismatch: expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("Member '{member}' is required and cannot be set to absent")]
    MissingValue { member: &'static str },

    #[error("Graph deeper than {limit} levels at {path}")]
    DepthExceeded { limit: usize, path: String },

    #[error("Copy incomplete: {} subtree(s) skipped, first at {}", .skipped.len(), first_path(.skipped))]
    Incomplete { skipped: Vec<SkippedNode> },
}

fn first_path(skipped: &[SkippedNode]) -> &str {
    skipped.first().map(|s| s.path.as_str()).unwrap_or("<root>")
}

/// A subtree the copy engine could not reproduce and left at its default
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedNode {
    /// Location in the source graph, e.g. `employees[2].address`
    pub path: String,

    /// Why the subtree was skipped
    pub reason: GraphError,
}

impl SkippedNode {
    pub(crate) fn new(path: &Path, reason: GraphError) -> Self {
        Self {
            path: path.to_string(),
            reason,
        }
    }
}

impl fmt::Display for SkippedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_message_names_first_path() {
        let err = GraphError::Incomplete {
            skipped: vec![
                SkippedNode {
                    path: "address".to_string(),
                    reason: GraphError::Construction { type_name: "Address" },
                },
                SkippedNode {
                    path: "tags[0]".to_string(),
                    reason: GraphError::Construction { type_name: "Tag" },
                },
            ],
        };

        assert_eq!(
            err.to_string(),
            "Copy incomplete: 2 subtree(s) skipped, first at address"
        );
    }

    #[test]
    fn skipped_node_display() {
        let node = SkippedNode {
            path: "employees[1]".to_string(),
            reason: GraphError::MissingValue { member: "name" },
        };
        assert_eq!(
            node.to_string(),
            "employees[1]: Member 'name' is required and cannot be set to absent"
        );
    }
}
