//! Collection adapters
//!
//! Arrays, sequences and mappings are enumerated and rebuilt through these
//! adapters regardless of their element types. Copy, Equal and Merge all use
//! the same adapters.

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::hash::Hash;

use super::error::GraphError;
use super::kind::{Capabilities, TypeInfo};
use super::reflect::{Reflect, Typed};

/// Fixed-length, homogeneous collections
pub trait ArrayAdapter {
    fn len(&self) -> usize;

    fn element(&self, index: usize) -> Option<&dyn Reflect>;

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Builds a new array of the same concrete type from `elements`
    fn assemble(&self, elements: Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, GraphError>;
}

/// Resizable, ordered collections
pub trait SequenceAdapter {
    fn len(&self) -> usize;

    fn element(&self, index: usize) -> Option<&dyn Reflect>;

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), GraphError>;

    fn truncate(&mut self, len: usize);

    /// Builds a new sequence of the same concrete type from `elements`
    fn assemble(&self, elements: Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, GraphError>;
}

/// Key/value collections with unique keys
pub trait MappingAdapter {
    fn len(&self) -> usize;

    fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_>;

    fn value(&self, key: &dyn Reflect) -> Option<&dyn Reflect>;

    fn value_mut(&mut self, key: &dyn Reflect) -> Option<&mut dyn Reflect>;

    fn insert(&mut self, key: Box<dyn Reflect>, value: Box<dyn Reflect>) -> Result<(), GraphError>;

    /// Drops every entry whose key `keep` rejects
    fn retain_keys(&mut self, keep: &mut dyn FnMut(&dyn Reflect) -> bool);

    /// Builds a new mapping of the same concrete type from `entries`
    fn assemble(
        &self,
        entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
    ) -> Result<Box<dyn Reflect>, GraphError>;
}

/// Moves a boxed node out as its concrete type
pub(crate) fn unbox<T: Typed>(value: Box<dyn Reflect>) -> Result<T, GraphError> {
    let found = value.type_info().name;
    value
        .into_any()
        .downcast::<T>()
        .map(|value| *value)
        .map_err(|_| GraphError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found,
        })
}

fn unbox_all<T: Typed>(elements: Vec<Box<dyn Reflect>>) -> Result<Vec<T>, GraphError> {
    elements.into_iter().map(unbox::<T>).collect()
}

// Arrays

impl<T: Typed, const N: usize> Reflect for [T; N] {
    crate::__reflect_any!();

    fn as_array(&self) -> Option<&dyn ArrayAdapter> {
        Some(self)
    }

    fn as_array_mut(&mut self) -> Option<&mut dyn ArrayAdapter> {
        Some(self)
    }
}

impl<T: Typed, const N: usize> Typed for [T; N] {
    fn static_info() -> TypeInfo {
        TypeInfo::of::<[T; N]>(Capabilities::ARRAY)
    }
}

impl<T: Typed, const N: usize> ArrayAdapter for [T; N] {
    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|e| e as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|e| e as &mut dyn Reflect)
    }

    fn assemble(&self, elements: Vec<Box<dyn Reflect>>) -> Result<Box<dyn Reflect>, GraphError> {
        let items = unbox_all::<T>(elements)?;
        let found = items.len();
        let array: [T; N] = items
            .try_into()
            .map_err(|_| GraphError::LengthMismatch { expected: N, found })?;
        Ok(Box::new(array))
    }
}

// Sequences

macro_rules! sequence_adapter {
    ($seq:ident, $push:ident) => {
        impl<T: Typed> Reflect for $seq<T> {
            crate::__reflect_any!();

            fn as_sequence(&self) -> Option<&dyn SequenceAdapter> {
                Some(self)
            }

            fn as_sequence_mut(&mut self) -> Option<&mut dyn SequenceAdapter> {
                Some(self)
            }
        }

        impl<T: Typed> Typed for $seq<T> {
            fn static_info() -> TypeInfo {
                TypeInfo::of::<$seq<T>>(Capabilities::SEQUENCE)
            }
        }

        impl<T: Typed> SequenceAdapter for $seq<T> {
            fn len(&self) -> usize {
                $seq::len(self)
            }

            fn element(&self, index: usize) -> Option<&dyn Reflect> {
                self.get(index).map(|e| e as &dyn Reflect)
            }

            fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
                self.get_mut(index).map(|e| e as &mut dyn Reflect)
            }

            fn push(&mut self, element: Box<dyn Reflect>) -> Result<(), GraphError> {
                $seq::$push(self, unbox::<T>(element)?);
                Ok(())
            }

            fn truncate(&mut self, len: usize) {
                $seq::truncate(self, len)
            }

            fn assemble(
                &self,
                elements: Vec<Box<dyn Reflect>>,
            ) -> Result<Box<dyn Reflect>, GraphError> {
                let items: $seq<T> = unbox_all::<T>(elements)?.into_iter().collect();
                Ok(Box::new(items))
            }
        }
    };
}

sequence_adapter!(Vec, push);
sequence_adapter!(VecDeque, push_back);

// Mappings

macro_rules! mapping_adapter {
    ($map:ident, $caps:expr, $($key_bound:tt)+) => {
        impl<K: Typed + $($key_bound)+, V: Typed> Reflect for $map<K, V> {
            crate::__reflect_any!();

            fn as_mapping(&self) -> Option<&dyn MappingAdapter> {
                Some(self)
            }

            fn as_mapping_mut(&mut self) -> Option<&mut dyn MappingAdapter> {
                Some(self)
            }
        }

        impl<K: Typed + $($key_bound)+, V: Typed> Typed for $map<K, V> {
            fn static_info() -> TypeInfo {
                TypeInfo::of::<$map<K, V>>($caps)
            }
        }

        impl<K: Typed + $($key_bound)+, V: Typed> MappingAdapter for $map<K, V> {
            fn len(&self) -> usize {
                $map::len(self)
            }

            fn entries(&self) -> Box<dyn Iterator<Item = (&dyn Reflect, &dyn Reflect)> + '_> {
                Box::new(
                    self.iter()
                        .map(|(k, v)| (k as &dyn Reflect, v as &dyn Reflect)),
                )
            }

            fn value(&self, key: &dyn Reflect) -> Option<&dyn Reflect> {
                let key = key.as_any().downcast_ref::<K>()?;
                self.get(key).map(|v| v as &dyn Reflect)
            }

            fn value_mut(&mut self, key: &dyn Reflect) -> Option<&mut dyn Reflect> {
                let key = key.as_any().downcast_ref::<K>()?;
                self.get_mut(key).map(|v| v as &mut dyn Reflect)
            }

            fn insert(
                &mut self,
                key: Box<dyn Reflect>,
                value: Box<dyn Reflect>,
            ) -> Result<(), GraphError> {
                let key = unbox::<K>(key)?;
                let value = unbox::<V>(value)?;
                $map::insert(self, key, value);
                Ok(())
            }

            fn retain_keys(&mut self, keep: &mut dyn FnMut(&dyn Reflect) -> bool) {
                self.retain(|k, _| keep(k));
            }

            fn assemble(
                &self,
                entries: Vec<(Box<dyn Reflect>, Box<dyn Reflect>)>,
            ) -> Result<Box<dyn Reflect>, GraphError> {
                let mut map = $map::<K, V>::new();
                for (key, value) in entries {
                    $map::insert(&mut map, unbox::<K>(key)?, unbox::<V>(value)?);
                }
                Ok(Box::new(map))
            }
        }
    };
}

mapping_adapter!(HashMap, Capabilities::MAPPING, Eq + Hash);
mapping_adapter!(BTreeMap, Capabilities::ORDERED_MAPPING, Ord);
