//! The one dispatch point shared by Copy, Equal and Merge
//!
//! A node is classified once and paired with the capability its kind calls
//! for. A type whose capability does not match its classification is treated
//! as unclassified.

use super::collections::{ArrayAdapter, MappingAdapter, SequenceAdapter};
use super::composite::CompositeDescriptor;
use super::kind::NodeKind;
use super::opaque::OpaqueBridge;
use super::reflect::{Leaf, Reflect};

pub(crate) enum View<'a> {
    Leaf(&'a dyn Leaf),
    Opaque(&'a dyn OpaqueBridge),
    Array(&'a dyn ArrayAdapter),
    Sequence(&'a dyn SequenceAdapter),
    Mapping(&'a dyn MappingAdapter),
    Composite(&'static CompositeDescriptor),
    Unclassified,
}

pub(crate) enum ViewMut<'a> {
    Leaf(&'a mut dyn Leaf),
    Opaque(&'a mut dyn OpaqueBridge),
    Array(&'a mut dyn ArrayAdapter),
    Sequence(&'a mut dyn SequenceAdapter),
    Mapping(&'a mut dyn MappingAdapter),
    /// Members are written through the descriptor taken from the source side
    Composite,
    Unclassified,
}

pub(crate) fn view(node: &dyn Reflect) -> View<'_> {
    let view = match node.kind() {
        NodeKind::LeafValue | NodeKind::LeafText => node.as_leaf().map(View::Leaf),
        NodeKind::LeafOpaque => node.as_opaque().map(View::Opaque),
        NodeKind::Array => node.as_array().map(View::Array),
        NodeKind::Sequence => node.as_sequence().map(View::Sequence),
        NodeKind::Mapping => node.as_mapping().map(View::Mapping),
        NodeKind::Composite => node.as_composite().map(View::Composite),
        NodeKind::Unclassified => None,
    };
    view.unwrap_or(View::Unclassified)
}

pub(crate) fn view_mut(node: &mut dyn Reflect) -> ViewMut<'_> {
    let view = match node.kind() {
        NodeKind::LeafValue | NodeKind::LeafText => node.as_leaf_mut().map(ViewMut::Leaf),
        NodeKind::LeafOpaque => node.as_opaque_mut().map(ViewMut::Opaque),
        NodeKind::Array => node.as_array_mut().map(ViewMut::Array),
        NodeKind::Sequence => node.as_sequence_mut().map(ViewMut::Sequence),
        NodeKind::Mapping => node.as_mapping_mut().map(ViewMut::Mapping),
        NodeKind::Composite => node.as_composite().map(|_| ViewMut::Composite),
        NodeKind::Unclassified => None,
    };
    view.unwrap_or(ViewMut::Unclassified)
}

/// Label of a mapping key inside a path
pub(crate) fn key_label(key: &dyn Reflect) -> String {
    match key.as_leaf() {
        Some(leaf) => leaf.render(),
        None => format!("<{}>", key.type_info().name),
    }
}
