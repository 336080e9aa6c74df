//! Generic object-graph engine
//!
//! Walks any value that implements [`Reflect`], classifies every node by
//! shape and applies one of three operations consistently across it:
//!
//! - [`copy`]: independent deep duplicate
//! - [`equal`]: structural comparison
//! - [`merge`]: in-place selective update that keeps the target's nested
//!   object identities
//!
//! All three share one dispatch point and one set of collection
//! adapters, so arrays, sequences and mappings behave the same way under
//! each operation.

mod collections;
mod composite;
mod copy;
mod equal;
mod error;
mod kind;
mod merge;
mod opaque;
mod path;
mod reflect;
mod view;

use serde::{Deserialize, Serialize};

pub use collections::{ArrayAdapter, MappingAdapter, SequenceAdapter};
pub use composite::{Composite, CompositeBuilder, CompositeDescriptor, Member, MemberAccess};
pub use copy::Copied;
pub use error::{GraphError, SkippedNode};
pub use kind::{classify, classify_caps, Capabilities, NodeKind, TypeInfo};
pub use merge::MergeSummary;
pub use opaque::{OpaqueBridge, SecretText};
pub use path::Path;
pub use reflect::{Leaf, Reflect, Typed};

/// Default nesting limit; record graphs are a handful of levels deep
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Tunables shared by all three operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Deepest path a walk may reach before failing
    pub max_depth: usize,

    /// Treat any skipped subtree during copy as an error
    pub strict_copy: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            strict_copy: false,
        }
    }
}

impl EngineOptions {
    pub(crate) fn check_depth(&self, path: &Path) -> Result<(), GraphError> {
        if path.depth() > self.max_depth {
            return Err(GraphError::DepthExceeded {
                limit: self.max_depth,
                path: path.to_string(),
            });
        }
        Ok(())
    }
}

/// Copy, Equal and Merge under a fixed set of options
#[derive(Debug, Clone, Default)]
pub struct Engine {
    options: EngineOptions,
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }
}

/// Deep-copies `value` with default options
pub fn copy<T: Typed>(value: &T) -> Result<Copied<T>, GraphError> {
    Engine::default().copy(value)
}

/// Structural equality with default options
pub fn equal<T: Typed>(a: &T, b: &T) -> bool {
    Engine::default().equal(a, b)
}

/// Structural equality that is false whenever either side is absent
pub fn equal_optional<T: Typed>(a: Option<&T>, b: Option<&T>) -> bool {
    Engine::default().equal_optional(a, b)
}

/// Merges `source` into `target` with default options
pub fn merge<'t, T: Typed>(source: &T, target: &'t mut T) -> Result<&'t mut T, GraphError> {
    Engine::default().merge(source, target)
}

/// Merges an optional source; absent means no-op
pub fn merge_optional<'t, T: Typed>(
    source: Option<&T>,
    target: &'t mut T,
) -> Result<&'t mut T, GraphError> {
    Engine::default().merge_optional(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = EngineOptions::default();
        assert_eq!(options.max_depth, 256);
        assert!(!options.strict_copy);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: EngineOptions = toml::from_str("strict_copy = true").unwrap();
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.strict_copy);
    }

    #[test]
    fn depth_check_reports_path() {
        let options = EngineOptions {
            max_depth: 0,
            ..EngineOptions::default()
        };
        let mut path = Path::root();
        assert!(options.check_depth(&path).is_ok());

        path.push_member("address");
        assert_eq!(
            options.check_depth(&path),
            Err(GraphError::DepthExceeded {
                limit: 0,
                path: "address".to_string()
            })
        );
    }

    #[test]
    fn free_functions_use_defaults() {
        let source = vec!["a".to_string(), "b".to_string()];
        let mut copy = copy(&source).unwrap().into_value();
        assert!(equal(&source, &copy));

        copy.push("c".to_string());
        assert_eq!(source.len(), 2);
        assert!(!equal(&source, &copy));

        merge(&source, &mut copy).unwrap();
        assert_eq!(copy, source);
        assert!(equal_optional(Some(&source), Some(&copy)));
        assert!(!equal_optional(Some(&source), None));

        merge_optional(None, &mut copy).unwrap();
        assert_eq!(copy, source);
    }
}
