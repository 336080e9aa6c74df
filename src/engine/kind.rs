//! Type classification
//!
//! Every type reachable from a record advertises a set of [`Capabilities`].
//! [`classify`] turns those into exactly one [`NodeKind`], checking in a fixed
//! order so that the first matching shape wins:
//!
//! | Order | Kind | Matches when |
//! |-------|------|--------------|
//! | 1 | `LeafOpaque` | the type is the protected text type |
//! | 2 | `LeafText` | the type is immutable text |
//! | 3 | `LeafValue` | the type is a plain value that cannot be decomposed |
//! | 4 | `Array` | fixed length, homogeneous elements |
//! | 5 | `Mapping` | unique-key/value enumeration |
//! | 6 | `Sequence` | ordered enumeration without keys |
//! | 7 | `Composite` | named mutable members |
//! | 8 | `Unclassified` | none of the above |
//!
//! Results are memoized per concrete type in a process-wide map.

use std::any::TypeId;
use std::fmt;
use std::sync::OnceLock;

use dashmap::DashMap;
use serde::Serialize;

/// Structural classification of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    LeafValue,
    LeafText,
    LeafOpaque,
    Array,
    Sequence,
    Mapping,
    Composite,
    Unclassified,
}

impl NodeKind {
    /// Returns true for the three leaf kinds (never traversed into)
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            NodeKind::LeafValue | NodeKind::LeafText | NodeKind::LeafOpaque
        )
    }

    /// Returns true for array, sequence and mapping nodes
    pub fn is_collection(&self) -> bool {
        matches!(self, NodeKind::Array | NodeKind::Sequence | NodeKind::Mapping)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::LeafValue => "leaf-value",
            NodeKind::LeafText => "leaf-text",
            NodeKind::LeafOpaque => "leaf-opaque",
            NodeKind::Array => "array",
            NodeKind::Sequence => "sequence",
            NodeKind::Mapping => "mapping",
            NodeKind::Composite => "composite",
            NodeKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Structural traits a type exposes to the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    /// Contents can only be read through a disclosure bridge
    pub opaque: bool,
    /// Immutable text, safe to alias
    pub text: bool,
    /// Copied by value, not decomposable
    pub value: bool,
    /// Length fixed by the type
    pub fixed_len: bool,
    /// Unique-key/value enumeration
    pub keyed: bool,
    /// Ordered element enumeration
    pub ordered: bool,
    /// Named mutable members
    pub members: bool,
}

impl Capabilities {
    pub const NONE: Self = Self {
        opaque: false,
        text: false,
        value: false,
        fixed_len: false,
        keyed: false,
        ordered: false,
        members: false,
    };

    pub const VALUE: Self = Self {
        value: true,
        ..Self::NONE
    };

    pub const TEXT: Self = Self {
        text: true,
        ..Self::NONE
    };

    pub const OPAQUE: Self = Self {
        opaque: true,
        ..Self::NONE
    };

    pub const ARRAY: Self = Self {
        fixed_len: true,
        ordered: true,
        ..Self::NONE
    };

    pub const SEQUENCE: Self = Self {
        ordered: true,
        ..Self::NONE
    };

    pub const MAPPING: Self = Self {
        keyed: true,
        ..Self::NONE
    };

    pub const ORDERED_MAPPING: Self = Self {
        keyed: true,
        ordered: true,
        ..Self::NONE
    };

    pub const COMPOSITE: Self = Self {
        members: true,
        ..Self::NONE
    };
}

/// Static description of a concrete type
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub id: TypeId,
    pub name: &'static str,
    pub caps: Capabilities,
}

impl TypeInfo {
    pub fn of<T: 'static>(caps: Capabilities) -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            caps,
        }
    }

    /// Classifies this type, consulting the process-wide cache
    pub fn kind(&self) -> NodeKind {
        classify(self)
    }
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

fn cache() -> &'static DashMap<TypeId, NodeKind> {
    static CACHE: OnceLock<DashMap<TypeId, NodeKind>> = OnceLock::new();
    CACHE.get_or_init(DashMap::new)
}

/// Classifies a type, memoizing the result per `TypeId`
pub fn classify(info: &TypeInfo) -> NodeKind {
    if let Some(kind) = cache().get(&info.id) {
        return *kind;
    }

    let kind = classify_caps(&info.caps);
    cache().insert(info.id, kind);
    kind
}

/// Classification proper: a pure function of the advertised capabilities
pub fn classify_caps(caps: &Capabilities) -> NodeKind {
    if caps.opaque {
        NodeKind::LeafOpaque
    } else if caps.text {
        NodeKind::LeafText
    } else if caps.value {
        NodeKind::LeafValue
    } else if caps.fixed_len {
        NodeKind::Array
    } else if caps.keyed {
        NodeKind::Mapping
    } else if caps.ordered {
        NodeKind::Sequence
    } else if caps.members {
        NodeKind::Composite
    } else {
        NodeKind::Unclassified
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_match_wins() {
        let both = Capabilities {
            opaque: true,
            text: true,
            ..Capabilities::NONE
        };
        assert_eq!(classify_caps(&both), NodeKind::LeafOpaque);

        assert_eq!(classify_caps(&Capabilities::ARRAY), NodeKind::Array);
        assert_eq!(
            classify_caps(&Capabilities::ORDERED_MAPPING),
            NodeKind::Mapping
        );
        assert_eq!(classify_caps(&Capabilities::SEQUENCE), NodeKind::Sequence);
    }

    #[test]
    fn no_capabilities_is_unclassified() {
        assert_eq!(classify_caps(&Capabilities::NONE), NodeKind::Unclassified);
    }

    #[test]
    fn classification_is_cached_per_type() {
        struct Marker;
        let info = TypeInfo::of::<Marker>(Capabilities::COMPOSITE);

        assert_eq!(classify(&info), NodeKind::Composite);
        assert!(cache().contains_key(&TypeId::of::<Marker>()));
        assert_eq!(info.kind(), NodeKind::Composite);
    }

    #[test]
    fn concurrent_classification_agrees() {
        struct Shared;
        let info = TypeInfo::of::<Shared>(Capabilities::SEQUENCE);

        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(move || classify(&info)))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), NodeKind::Sequence);
        }
    }

    #[test]
    fn kind_predicates() {
        assert!(NodeKind::LeafOpaque.is_leaf());
        assert!(!NodeKind::Composite.is_leaf());
        assert!(NodeKind::Mapping.is_collection());
        assert!(!NodeKind::LeafText.is_collection());
        assert_eq!(NodeKind::LeafValue.to_string(), "leaf-value");
    }
}
