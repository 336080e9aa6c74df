//! Copy Engine: independent deep duplicates

use super::collections::{unbox, ArrayAdapter, MappingAdapter, SequenceAdapter};
use super::composite::CompositeDescriptor;
use super::error::{GraphError, SkippedNode};
use super::path::Path;
use super::reflect::{Reflect, Typed};
use super::view::{key_label, view, View};
use super::{Engine, EngineOptions};

/// Result of a best-effort copy
///
/// Subtrees that could not be reproduced are left at their default (or
/// dropped from their collection) and listed in [`Copied::skipped`].
#[derive(Debug)]
pub struct Copied<T> {
    value: T,
    skipped: Vec<SkippedNode>,
}

impl<T> Copied<T> {
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn skipped(&self) -> &[SkippedNode] {
        &self.skipped
    }

    /// True when every subtree was copied
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    /// Turns any skipped subtree into [`GraphError::Incomplete`]
    pub fn strict(self) -> Result<T, GraphError> {
        if self.skipped.is_empty() {
            Ok(self.value)
        } else {
            Err(GraphError::Incomplete {
                skipped: self.skipped,
            })
        }
    }
}

impl Engine {
    /// Deep-copies `value`
    ///
    /// Fails only when the root itself cannot be built, when the graph is
    /// deeper than `max_depth`, or when `strict_copy` is set and a subtree
    /// was skipped.
    pub fn copy<T: Typed>(&self, value: &T) -> Result<Copied<T>, GraphError> {
        let mut copier = Copier::new(self.options(), Path::root());
        let copy = copier.node(value)?;
        let skipped = self.finish(value.type_info().name, copier.into_skipped())?;
        Ok(Copied {
            value: unbox::<T>(copy)?,
            skipped,
        })
    }

    /// Deep-copies a node of any type, returning the skipped subtrees alongside
    ///
    /// Honors `strict_copy` the same way [`Engine::copy`] does.
    pub fn copy_dyn(
        &self,
        value: &dyn Reflect,
    ) -> Result<(Box<dyn Reflect>, Vec<SkippedNode>), GraphError> {
        let mut copier = Copier::new(self.options(), Path::root());
        let copy = copier.node(value)?;
        let skipped = self.finish(value.type_info().name, copier.into_skipped())?;
        Ok((copy, skipped))
    }

    fn finish(&self, type_name: &str, skipped: Vec<SkippedNode>) -> Result<Vec<SkippedNode>, GraphError> {
        if skipped.is_empty() {
            return Ok(skipped);
        }

        tracing::debug!(type_name, skipped = skipped.len(), "copy incomplete");
        if self.options().strict_copy {
            return Err(GraphError::Incomplete { skipped });
        }
        Ok(skipped)
    }
}

/// Records a recoverable failure at `path`, passing fatal ones through
pub(crate) fn settle<V>(
    path: &Path,
    skipped: &mut Vec<SkippedNode>,
    result: Result<V, GraphError>,
) -> Result<Option<V>, GraphError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err @ GraphError::DepthExceeded { .. }) => Err(err),
        Err(reason) => {
            tracing::debug!(path = %path, reason = %reason, "skipping subtree");
            skipped.push(SkippedNode::new(path, reason));
            Ok(None)
        }
    }
}

pub(crate) struct Copier<'e> {
    options: &'e EngineOptions,
    path: Path,
    skipped: Vec<SkippedNode>,
}

impl<'e> Copier<'e> {
    /// Starts a copy at `path`, so nested copies report full paths
    pub(crate) fn new(options: &'e EngineOptions, path: Path) -> Self {
        Self {
            options,
            path,
            skipped: Vec::new(),
        }
    }

    pub(crate) fn into_skipped(self) -> Vec<SkippedNode> {
        self.skipped
    }

    pub(crate) fn node(&mut self, node: &dyn Reflect) -> Result<Box<dyn Reflect>, GraphError> {
        self.options.check_depth(&self.path)?;

        match view(node) {
            View::Leaf(leaf) => Ok(leaf.duplicate()),
            View::Opaque(bridge) => Ok(bridge.duplicate()),
            View::Array(array) => self.array(array),
            View::Sequence(seq) => self.sequence(seq),
            View::Mapping(map) => self.mapping(map),
            View::Composite(desc) => self.composite(desc, node),
            View::Unclassified => node.instantiate().ok_or(GraphError::Construction {
                type_name: node.type_info().name,
            }),
        }
    }

    // Any failed element fails the whole array.
    fn array(&mut self, array: &dyn ArrayAdapter) -> Result<Box<dyn Reflect>, GraphError> {
        let mut elements = Vec::with_capacity(array.len());
        for index in 0..array.len() {
            let Some(element) = array.element(index) else {
                continue;
            };
            self.path.push_index(index);
            let copy = self.node(element);
            self.path.pop();
            elements.push(copy?);
        }
        array.assemble(elements)
    }

    fn sequence(&mut self, seq: &dyn SequenceAdapter) -> Result<Box<dyn Reflect>, GraphError> {
        let mut elements = Vec::with_capacity(seq.len());
        for index in 0..seq.len() {
            let Some(element) = seq.element(index) else {
                continue;
            };
            self.path.push_index(index);
            let copy = self.node(element);
            let copy = settle(&self.path, &mut self.skipped, copy);
            self.path.pop();
            if let Some(copy) = copy? {
                elements.push(copy);
            }
        }
        seq.assemble(elements)
    }

    fn mapping(&mut self, map: &dyn MappingAdapter) -> Result<Box<dyn Reflect>, GraphError> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, value) in map.entries() {
            self.path.push_key(key_label(key));
            let entry = match self.node(key) {
                Ok(key) => self.node(value).map(|value| (key, value)),
                Err(err) => Err(err),
            };
            let entry = settle(&self.path, &mut self.skipped, entry);
            self.path.pop();
            if let Some(entry) = entry? {
                entries.push(entry);
            }
        }
        map.assemble(entries)
    }

    fn composite(
        &mut self,
        desc: &CompositeDescriptor,
        node: &dyn Reflect,
    ) -> Result<Box<dyn Reflect>, GraphError> {
        let mut copy = desc.construct()?;

        for member in desc.members() {
            self.path.push_member(member.name());
            let result = match member.get(node) {
                Some(value) => self
                    .node(value)
                    .and_then(|value| member.set(copy.as_mut(), Some(value))),
                None => member.set(copy.as_mut(), None),
            };
            let result = settle(&self.path, &mut self.skipped, result);
            self.path.pop();
            result?;
        }
        Ok(copy)
    }
}
