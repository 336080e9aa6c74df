//! Merge Engine: in-place selective update
//!
//! Only differing leaves are written. Nested composites and collections that
//! exist on both sides are merged into, never replaced, so the target keeps
//! the identity of every nested object it already owned.

use super::collections::{ArrayAdapter, MappingAdapter, SequenceAdapter};
use super::composite::{CompositeDescriptor, Member};
use super::copy::{settle, Copier};
use super::equal::check_graph_depth;
use super::error::{GraphError, SkippedNode};
use super::path::Path;
use super::reflect::{Reflect, Typed};
use super::view::{key_label, view, view_mut, View, ViewMut};
use super::{Engine, EngineOptions};

/// What a merge changed in the target
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeSummary {
    /// Paths of every assigned leaf, added or removed member, element or entry
    pub changed: Vec<String>,

    /// Source subtrees that could not be copied into the target
    pub skipped: Vec<SkippedNode>,
}

impl MergeSummary {
    pub fn is_unchanged(&self) -> bool {
        self.changed.is_empty()
    }
}

impl Engine {
    /// Merges `source` into `target` in place and returns `target`
    pub fn merge<'t, T: Typed>(&self, source: &T, target: &'t mut T) -> Result<&'t mut T, GraphError> {
        self.merge_report(source, target)?;
        Ok(target)
    }

    /// Like [`Engine::merge`]; an absent source leaves `target` untouched
    pub fn merge_optional<'t, T: Typed>(
        &self,
        source: Option<&T>,
        target: &'t mut T,
    ) -> Result<&'t mut T, GraphError> {
        match source {
            Some(source) => self.merge(source, target),
            None => Ok(target),
        }
    }

    /// Merges and reports which paths changed
    pub fn merge_report<T: Typed>(&self, source: &T, target: &mut T) -> Result<MergeSummary, GraphError> {
        self.merge_dyn(source, target)
    }

    /// Merges nodes of any type; mismatched types are a no-op
    ///
    /// A source deeper than `max_depth` fails before `target` is touched.
    pub fn merge_dyn(
        &self,
        source: &dyn Reflect,
        target: &mut dyn Reflect,
    ) -> Result<MergeSummary, GraphError> {
        check_graph_depth(self.options(), source)?;

        let mut merger = Merger {
            options: self.options(),
            path: Path::root(),
            summary: MergeSummary::default(),
        };
        merger.node(source, target)?;

        tracing::debug!(
            type_name = target.type_info().name,
            changed = merger.summary.changed.len(),
            "merge finished"
        );
        Ok(merger.summary)
    }
}

struct Merger<'e> {
    options: &'e EngineOptions,
    path: Path,
    summary: MergeSummary,
}

impl Merger<'_> {
    fn node(&mut self, source: &dyn Reflect, target: &mut dyn Reflect) -> Result<(), GraphError> {
        self.options.check_depth(&self.path)?;

        if source.type_info() != target.type_info() {
            tracing::debug!(
                path = %self.path,
                source_type = source.type_info().name,
                target_type = target.type_info().name,
                "type mismatch, nothing merged"
            );
            return Ok(());
        }

        match (view(source), view_mut(target)) {
            (View::Leaf(_), ViewMut::Leaf(leaf)) => {
                if leaf.assign_if_different(source) {
                    self.changed();
                }
                Ok(())
            }
            (View::Opaque(_), ViewMut::Opaque(bridge)) => {
                if bridge.merge_if_different(source) {
                    self.changed();
                }
                Ok(())
            }
            (View::Array(src), ViewMut::Array(dst)) => self.array(src, dst),
            (View::Sequence(src), ViewMut::Sequence(dst)) => self.sequence(src, dst),
            (View::Mapping(src), ViewMut::Mapping(dst)) => self.mapping(src, dst),
            (View::Composite(desc), ViewMut::Composite) => self.composite(desc, source, target),
            _ => Ok(()),
        }
    }

    fn changed(&mut self) {
        tracing::trace!(path = %self.path, "changed");
        self.summary.changed.push(self.path.to_string());
    }

    /// Copies a source subtree that has no counterpart in the target yet
    fn copy(&mut self, node: &dyn Reflect) -> Result<Box<dyn Reflect>, GraphError> {
        let mut copier = Copier::new(self.options, self.path.clone());
        let copy = copier.node(node);
        self.summary.skipped.extend(copier.into_skipped());
        copy
    }

    fn settle(&mut self, result: Result<(), GraphError>) -> Result<(), GraphError> {
        settle(&self.path, &mut self.summary.skipped, result).map(|_| ())
    }

    fn array(&mut self, source: &dyn ArrayAdapter, target: &mut dyn ArrayAdapter) -> Result<(), GraphError> {
        for index in 0..source.len().min(target.len()) {
            let (Some(src), Some(dst)) = (source.element(index), target.element_mut(index)) else {
                continue;
            };
            self.path.push_index(index);
            let merged = self.node(src, dst);
            self.path.pop();
            merged?;
        }
        Ok(())
    }

    fn sequence(
        &mut self,
        source: &dyn SequenceAdapter,
        target: &mut dyn SequenceAdapter,
    ) -> Result<(), GraphError> {
        let common = source.len().min(target.len());

        for index in 0..common {
            let (Some(src), Some(dst)) = (source.element(index), target.element_mut(index)) else {
                continue;
            };
            self.path.push_index(index);
            let merged = self.node(src, dst);
            self.path.pop();
            merged?;
        }

        for index in source.len()..target.len() {
            self.path.push_index(index);
            self.changed();
            self.path.pop();
        }
        target.truncate(source.len());

        for index in common..source.len() {
            let Some(src) = source.element(index) else {
                continue;
            };
            self.path.push_index(index);
            let appended = self.append(src, target);
            let appended = self.settle(appended);
            self.path.pop();
            appended?;
        }
        Ok(())
    }

    fn append(&mut self, element: &dyn Reflect, target: &mut dyn SequenceAdapter) -> Result<(), GraphError> {
        let copy = self.copy(element)?;
        target.push(copy)?;
        self.changed();
        Ok(())
    }

    fn mapping(&mut self, source: &dyn MappingAdapter, target: &mut dyn MappingAdapter) -> Result<(), GraphError> {
        let mut removed = Vec::new();
        target.retain_keys(&mut |key| {
            let keep = source.value(key).is_some();
            if !keep {
                removed.push(key_label(key));
            }
            keep
        });
        for key in removed {
            self.path.push_key(key);
            self.changed();
            self.path.pop();
        }

        for (key, value) in source.entries() {
            self.path.push_key(key_label(key));
            let result = match target.value_mut(key) {
                Some(existing) => self.node(value, existing),
                None => self.insert(key, value, target),
            };
            let result = self.settle(result);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn insert(
        &mut self,
        key: &dyn Reflect,
        value: &dyn Reflect,
        target: &mut dyn MappingAdapter,
    ) -> Result<(), GraphError> {
        let key = self.copy(key)?;
        let value = self.copy(value)?;
        target.insert(key, value)?;
        self.changed();
        Ok(())
    }

    fn composite(
        &mut self,
        desc: &CompositeDescriptor,
        source: &dyn Reflect,
        target: &mut dyn Reflect,
    ) -> Result<(), GraphError> {
        for member in desc.members() {
            self.path.push_member(member.name());
            let result = self.member(member, source, target);
            let result = self.settle(result);
            self.path.pop();
            result?;
        }
        Ok(())
    }

    fn member(&mut self, member: &Member, source: &dyn Reflect, target: &mut dyn Reflect) -> Result<(), GraphError> {
        let present = member.get(target).is_some();

        match (member.get(source), present) {
            (Some(src), true) => match member.get_mut(target) {
                Some(dst) => self.node(src, dst),
                None => Ok(()),
            },
            (Some(src), false) => {
                let copy = self.copy(src)?;
                member.set(target, Some(copy))?;
                self.changed();
                Ok(())
            }
            (None, true) => {
                member.set(target, None)?;
                self.changed();
                Ok(())
            }
            (None, false) => Ok(()),
        }
    }
}
