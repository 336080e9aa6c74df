//! Capability-based access to values
//!
//! The engines never inspect a value directly. Each type implements
//! [`Reflect`] and hands out at most one capability matching its
//! classification: a [`Leaf`], an [`OpaqueBridge`], one of the collection
//! adapters, or its static [`CompositeDescriptor`].
//!
//! Plain values register with [`reflect_value!`](crate::reflect_value):
//!
//! ```
//! use model_graph::reflect_value;
//!
//! #[derive(Debug, Clone, PartialEq)]
//! enum Tier {
//!     Free,
//!     Paid,
//! }
//!
//! reflect_value!(Tier);
//! ```

use std::any::Any;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};

use super::collections::{ArrayAdapter, MappingAdapter, SequenceAdapter};
use super::composite::CompositeDescriptor;
use super::kind::{Capabilities, NodeKind, TypeInfo};
use super::opaque::OpaqueBridge;

/// A value the engine can classify and traverse
pub trait Reflect: Any {
    /// Static description of the concrete type
    fn type_info(&self) -> TypeInfo;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn as_leaf(&self) -> Option<&dyn Leaf> {
        None
    }

    fn as_leaf_mut(&mut self) -> Option<&mut dyn Leaf> {
        None
    }

    fn as_opaque(&self) -> Option<&dyn OpaqueBridge> {
        None
    }

    fn as_opaque_mut(&mut self) -> Option<&mut dyn OpaqueBridge> {
        None
    }

    fn as_array(&self) -> Option<&dyn ArrayAdapter> {
        None
    }

    fn as_array_mut(&mut self) -> Option<&mut dyn ArrayAdapter> {
        None
    }

    fn as_sequence(&self) -> Option<&dyn SequenceAdapter> {
        None
    }

    fn as_sequence_mut(&mut self) -> Option<&mut dyn SequenceAdapter> {
        None
    }

    fn as_mapping(&self) -> Option<&dyn MappingAdapter> {
        None
    }

    fn as_mapping_mut(&mut self) -> Option<&mut dyn MappingAdapter> {
        None
    }

    fn as_composite(&self) -> Option<&'static CompositeDescriptor> {
        None
    }

    /// Fresh empty instance of the same concrete type, if one can be built
    ///
    /// Used for shallow copies of types with no traversable shape.
    fn instantiate(&self) -> Option<Box<dyn Reflect>> {
        None
    }
}

impl dyn Reflect {
    /// Classifies the concrete type behind this reference
    pub fn kind(&self) -> NodeKind {
        self.type_info().kind()
    }

    pub fn is<T: Reflect>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Reflect>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: Reflect>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

impl fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_leaf() {
            Some(leaf) => write!(f, "{}({})", self.type_info().name, leaf.render()),
            None => write!(f, "{}", self.type_info().name),
        }
    }
}

/// Types whose description is known without an instance
///
/// Needed for members that are currently absent.
pub trait Typed: Reflect + Sized {
    fn static_info() -> TypeInfo;
}

/// Value and text leaves: copied by value, compared by value
pub trait Leaf {
    fn duplicate(&self) -> Box<dyn Reflect>;

    fn equals(&self, other: &dyn Reflect) -> bool;

    /// Overwrites `self` with `source` when they differ, returning true on change
    fn assign_if_different(&mut self, source: &dyn Reflect) -> bool;

    /// Short rendering used in paths and logs
    fn render(&self) -> String;
}

/// Registers plain value types (enums, newtypes, ...) as `LeafValue` nodes
///
/// The type must be `Clone + PartialEq + Debug + 'static`.
#[macro_export]
macro_rules! reflect_value {
    ($($ty:ty),+ $(,)?) => {
        $(
            $crate::__reflect_leaf!(
                $ty,
                $crate::engine::Capabilities::VALUE,
                |a: &$ty, b: &$ty| a == b
            );
        )+
    };
}

/// Registers types with no traversable shape as `Unclassified` nodes
///
/// Copies of such values are fresh `Default` instances, two values of the
/// same type always compare equal and merging them does nothing.
#[macro_export]
macro_rules! reflect_unclassified {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::engine::Reflect for $ty {
                $crate::__reflect_any!();

                fn instantiate(
                    &self,
                ) -> ::std::option::Option<::std::boxed::Box<dyn $crate::engine::Reflect>> {
                    ::std::option::Option::Some(::std::boxed::Box::new(
                        <$ty as ::std::default::Default>::default(),
                    ))
                }
            }

            impl $crate::engine::Typed for $ty {
                fn static_info() -> $crate::engine::TypeInfo {
                    $crate::engine::TypeInfo::of::<$ty>($crate::engine::Capabilities::NONE)
                }
            }
        )+
    };
}

/// The `Any` plumbing every `Reflect` impl shares; expects `Self: Typed`
#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_any {
    () => {
        fn type_info(&self) -> $crate::engine::TypeInfo {
            <Self as $crate::engine::Typed>::static_info()
        }

        fn as_any(&self) -> &dyn ::std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn ::std::any::Any {
            self
        }

        fn into_any(self: ::std::boxed::Box<Self>) -> ::std::boxed::Box<dyn ::std::any::Any> {
            self
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __reflect_leaf {
    ($ty:ty, $caps:expr, $eq:expr) => {
        impl $crate::engine::Reflect for $ty {
            $crate::__reflect_any!();

            fn as_leaf(&self) -> ::std::option::Option<&dyn $crate::engine::Leaf> {
                ::std::option::Option::Some(self)
            }

            fn as_leaf_mut(&mut self) -> ::std::option::Option<&mut dyn $crate::engine::Leaf> {
                ::std::option::Option::Some(self)
            }
        }

        impl $crate::engine::Typed for $ty {
            fn static_info() -> $crate::engine::TypeInfo {
                $crate::engine::TypeInfo::of::<$ty>($caps)
            }
        }

        impl $crate::engine::Leaf for $ty {
            fn duplicate(&self) -> ::std::boxed::Box<dyn $crate::engine::Reflect> {
                ::std::boxed::Box::new(::std::clone::Clone::clone(self))
            }

            fn equals(&self, other: &dyn $crate::engine::Reflect) -> bool {
                let eq: fn(&$ty, &$ty) -> bool = $eq;
                other
                    .as_any()
                    .downcast_ref::<$ty>()
                    .is_some_and(|other| eq(self, other))
            }

            fn assign_if_different(&mut self, source: &dyn $crate::engine::Reflect) -> bool {
                if $crate::engine::Leaf::equals(self, source) {
                    return false;
                }
                match source.as_any().downcast_ref::<$ty>() {
                    ::std::option::Option::Some(source) => {
                        *self = ::std::clone::Clone::clone(source);
                        true
                    }
                    ::std::option::Option::None => false,
                }
            }

            fn render(&self) -> ::std::string::String {
                format!("{:?}", self)
            }
        }
    };
}

crate::reflect_value!(
    bool,
    char,
    (),
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    Duration,
    DateTime<Utc>,
    NaiveDate,
    NaiveDateTime,
    NaiveTime,
);

// NaN compares equal to itself so that equality stays reflexive.
crate::__reflect_leaf!(f32, Capabilities::VALUE, |a: &f32, b: &f32| a == b
    || (a.is_nan() && b.is_nan()));
crate::__reflect_leaf!(f64, Capabilities::VALUE, |a: &f64, b: &f64| a == b
    || (a.is_nan() && b.is_nan()));

crate::__reflect_leaf!(String, Capabilities::TEXT, |a: &String, b: &String| a == b);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitives_classify_as_values() {
        assert_eq!(42u32.type_info().kind(), NodeKind::LeafValue);
        assert_eq!(true.type_info().kind(), NodeKind::LeafValue);
        assert_eq!(
            NaiveDate::from_ymd_opt(2024, 1, 2)
                .unwrap()
                .type_info()
                .kind(),
            NodeKind::LeafValue
        );
    }

    #[test]
    fn string_is_text() {
        assert_eq!(String::static_info().kind(), NodeKind::LeafText);
    }

    #[test]
    fn leaf_equality_by_value() {
        let a = String::from("Linz");
        let b = String::from("Linz");
        let c = String::from("Graz");

        assert!(a.equals(&b));
        assert!(!a.equals(&c));
        // different concrete type is never equal
        assert!(!7u32.equals(&7u64));
    }

    #[test]
    fn nan_is_reflexive() {
        assert!(f64::NAN.equals(&f64::NAN));
        assert!(!1.5f32.equals(&2.5f32));
    }

    #[test]
    fn assign_if_different_reports_change() {
        let mut target = String::from("Bob");

        assert!(target.assign_if_different(&String::from("Ann")));
        assert_eq!(target, "Ann");
        assert!(!target.assign_if_different(&String::from("Ann")));
        // mismatched type leaves the target alone
        assert!(!target.assign_if_different(&3u8));
        assert_eq!(target, "Ann");
    }

    #[test]
    fn duplicate_is_independent() {
        let original = String::from("a");
        let copy = original.duplicate();
        let copy = copy.into_any().downcast::<String>().unwrap();

        assert_eq!(*copy, "a");
        assert_ne!(copy.as_ptr(), original.as_ptr());
    }

    #[test]
    fn boxed_nodes_debug_by_type() {
        let leaf: Box<dyn Reflect> = Box::new(7u8);
        let list: Box<dyn Reflect> = Box::new(vec![1u8]);

        assert_eq!(format!("{:?}", leaf), "u8(7)");
        assert!(format!("{:?}", list).ends_with("Vec<u8>"));
        // results carrying nodes can be unwrapped in either direction
        let failed: Result<Box<dyn Reflect>, &str> = Err("no");
        assert_eq!(failed.unwrap_err(), "no");
    }

    #[test]
    fn dyn_downcast_helpers() {
        let mut value: Box<dyn Reflect> = Box::new(5i32);
        assert!(value.is::<i32>());
        assert_eq!(value.downcast_ref::<i32>(), Some(&5));
        *value.downcast_mut::<i32>().unwrap() = 6;
        assert_eq!(value.downcast_ref::<i32>(), Some(&6));
        assert_eq!(value.kind(), NodeKind::LeafValue);
    }
}
