//! Equality Engine: structural comparison

use super::collections::{ArrayAdapter, MappingAdapter, SequenceAdapter};
use super::composite::CompositeDescriptor;
use super::error::GraphError;
use super::path::Path;
use super::reflect::{Reflect, Typed};
use super::view::{key_label, view, View};
use super::{Engine, EngineOptions};

impl Engine {
    /// Structural equality of two graphs
    ///
    /// A graph deeper than `max_depth` compares unequal.
    pub fn equal<T: Typed>(&self, a: &T, b: &T) -> bool {
        self.equal_dyn(a, b)
    }

    /// Like [`Engine::equal`], but false whenever either side is absent
    pub fn equal_optional<T: Typed>(&self, a: Option<&T>, b: Option<&T>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => self.equal(a, b),
            _ => false,
        }
    }

    /// Compares nodes of any type; different concrete types are unequal
    pub fn equal_dyn(&self, a: &dyn Reflect, b: &dyn Reflect) -> bool {
        let mut comparer = Comparer {
            options: self.options(),
            path: Path::root(),
        };
        match comparer.node(a, b) {
            Ok(same) => same,
            Err(err) => {
                tracing::warn!(error = %err, "equality check aborted");
                false
            }
        }
    }
}

/// Walks `node` read-only and fails if it nests deeper than `max_depth`
pub(crate) fn check_graph_depth(options: &EngineOptions, node: &dyn Reflect) -> Result<(), GraphError> {
    let mut comparer = Comparer {
        options,
        path: Path::root(),
    };
    comparer.node(node, node).map(|_| ())
}

struct Comparer<'e> {
    options: &'e EngineOptions,
    path: Path,
}

impl Comparer<'_> {
    fn node(&mut self, a: &dyn Reflect, b: &dyn Reflect) -> Result<bool, GraphError> {
        self.options.check_depth(&self.path)?;

        if a.type_info() != b.type_info() {
            return Ok(false);
        }

        match (view(a), view(b)) {
            (View::Leaf(leaf), _) => Ok(leaf.equals(b)),
            (View::Opaque(bridge), _) => Ok(bridge.equals(b)),
            (View::Array(x), View::Array(y)) => self.array(x, y),
            (View::Sequence(x), View::Sequence(y)) => self.sequence(x, y),
            (View::Mapping(x), View::Mapping(y)) => self.mapping(x, y),
            (View::Composite(desc), View::Composite(_)) => self.composite(desc, a, b),
            (View::Unclassified, View::Unclassified) => Ok(true),
            _ => Ok(false),
        }
    }

    /// Absent on both sides is equal, absent on one side is not
    fn slot(&mut self, a: Option<&dyn Reflect>, b: Option<&dyn Reflect>) -> Result<bool, GraphError> {
        match (a, b) {
            (Some(a), Some(b)) => self.node(a, b),
            (None, None) => Ok(true),
            _ => Ok(false),
        }
    }

    fn array(&mut self, a: &dyn ArrayAdapter, b: &dyn ArrayAdapter) -> Result<bool, GraphError> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for index in 0..a.len() {
            self.path.push_index(index);
            let same = self.slot(a.element(index), b.element(index));
            self.path.pop();
            if !same? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn sequence(
        &mut self,
        a: &dyn SequenceAdapter,
        b: &dyn SequenceAdapter,
    ) -> Result<bool, GraphError> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for index in 0..a.len() {
            self.path.push_index(index);
            let same = self.slot(a.element(index), b.element(index));
            self.path.pop();
            if !same? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn mapping(&mut self, a: &dyn MappingAdapter, b: &dyn MappingAdapter) -> Result<bool, GraphError> {
        if a.len() != b.len() {
            return Ok(false);
        }
        for (key, value) in a.entries() {
            let Some(other) = b.value(key) else {
                return Ok(false);
            };
            self.path.push_key(key_label(key));
            let same = self.node(value, other);
            self.path.pop();
            if !same? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn composite(
        &mut self,
        desc: &CompositeDescriptor,
        a: &dyn Reflect,
        b: &dyn Reflect,
    ) -> Result<bool, GraphError> {
        for member in desc.members() {
            self.path.push_member(member.name());
            let same = self.slot(member.get(a), member.get(b));
            self.path.pop();
            if !same? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
