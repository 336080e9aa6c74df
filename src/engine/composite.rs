//! Composite descriptors
//!
//! A composite type publishes a static table of its members, each with a
//! getter, a setter and the declared type, plus an optional constructor for
//! an empty instance. The engines consume only this table.
//!
//! ```
//! use std::sync::OnceLock;
//!
//! use model_graph::engine::{Composite, CompositeDescriptor};
//! use model_graph::reflect_composite;
//!
//! #[derive(Debug, Default)]
//! struct Point {
//!     x: i32,
//!     label: Option<String>,
//! }
//!
//! impl Composite for Point {
//!     fn descriptor() -> &'static CompositeDescriptor {
//!         static DESCRIPTOR: OnceLock<CompositeDescriptor> = OnceLock::new();
//!         DESCRIPTOR.get_or_init(|| {
//!             CompositeDescriptor::builder::<Point>()
//!                 .constructor(Point::default)
//!                 .member("x", |p| &p.x, |p| &mut p.x)
//!                 .optional("label", |p| &p.label, |p| &mut p.label)
//!                 .build()
//!         })
//!     }
//! }
//!
//! reflect_composite!(Point);
//!
//! assert_eq!(Point::descriptor().members().len(), 2);
//! ```

use std::fmt;
use std::marker::PhantomData;

use super::collections::unbox;
use super::error::GraphError;
use super::kind::{NodeKind, TypeInfo};
use super::reflect::{Reflect, Typed};

/// Types exposing a member table
pub trait Composite: 'static {
    fn descriptor() -> &'static CompositeDescriptor;
}

/// Getter/setter pair for one member, erased over the owner type
pub trait MemberAccess: Send + Sync {
    /// Current value, `None` when the member is absent
    fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect>;

    fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect>;

    /// Replaces the member's value; `None` clears an optional member
    fn set(&self, owner: &mut dyn Reflect, value: Option<Box<dyn Reflect>>) -> Result<(), GraphError>;
}

struct Required<S, F> {
    name: &'static str,
    get: fn(&S) -> &F,
    get_mut: fn(&mut S) -> &mut F,
}

struct Optional<S, F> {
    get: fn(&S) -> &Option<F>,
    get_mut: fn(&mut S) -> &mut Option<F>,
}

fn owner_mut<S: Typed>(owner: &mut dyn Reflect) -> Result<&mut S, GraphError> {
    let found = owner.type_info().name;
    owner
        .as_any_mut()
        .downcast_mut::<S>()
        .ok_or(GraphError::TypeMismatch {
            expected: std::any::type_name::<S>(),
            found,
        })
}

impl<S: Typed, F: Typed> MemberAccess for Required<S, F> {
    fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        let owner = owner.as_any().downcast_ref::<S>()?;
        Some((self.get)(owner) as &dyn Reflect)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        let owner = owner.as_any_mut().downcast_mut::<S>()?;
        Some((self.get_mut)(owner) as &mut dyn Reflect)
    }

    fn set(&self, owner: &mut dyn Reflect, value: Option<Box<dyn Reflect>>) -> Result<(), GraphError> {
        let value = value.ok_or(GraphError::MissingValue { member: self.name })?;
        let value = unbox::<F>(value)?;
        *(self.get_mut)(owner_mut::<S>(owner)?) = value;
        Ok(())
    }
}

impl<S: Typed, F: Typed> MemberAccess for Optional<S, F> {
    fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        let owner = owner.as_any().downcast_ref::<S>()?;
        (self.get)(owner).as_ref().map(|v| v as &dyn Reflect)
    }

    fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        let owner = owner.as_any_mut().downcast_mut::<S>()?;
        (self.get_mut)(owner).as_mut().map(|v| v as &mut dyn Reflect)
    }

    fn set(&self, owner: &mut dyn Reflect, value: Option<Box<dyn Reflect>>) -> Result<(), GraphError> {
        let value = value.map(unbox::<F>).transpose()?;
        *(self.get_mut)(owner_mut::<S>(owner)?) = value;
        Ok(())
    }
}

/// One named, mutable member of a composite type
pub struct Member {
    name: &'static str,
    declared: TypeInfo,
    optional: bool,
    access: Box<dyn MemberAccess>,
}

impl Member {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the member (the `T` of an `Option<T>` member)
    pub fn declared(&self) -> TypeInfo {
        self.declared
    }

    /// Node kind of the declared type
    pub fn kind(&self) -> NodeKind {
        self.declared.kind()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn get<'a>(&self, owner: &'a dyn Reflect) -> Option<&'a dyn Reflect> {
        self.access.get(owner)
    }

    pub fn get_mut<'a>(&self, owner: &'a mut dyn Reflect) -> Option<&'a mut dyn Reflect> {
        self.access.get_mut(owner)
    }

    pub fn set(&self, owner: &mut dyn Reflect, value: Option<Box<dyn Reflect>>) -> Result<(), GraphError> {
        self.access.set(owner, value)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("declared", &self.declared.name)
            .field("optional", &self.optional)
            .finish()
    }
}

type Constructor = Box<dyn Fn() -> Box<dyn Reflect> + Send + Sync>;

/// Static member table of a composite type
pub struct CompositeDescriptor {
    info: TypeInfo,
    constructor: Option<Constructor>,
    members: Vec<Member>,
}

impl CompositeDescriptor {
    pub fn builder<S: Typed>() -> CompositeBuilder<S> {
        CompositeBuilder {
            constructor: None,
            members: Vec::new(),
            _owner: PhantomData,
        }
    }

    pub fn type_info(&self) -> TypeInfo {
        self.info
    }

    pub fn name(&self) -> &'static str {
        self.info.name
    }

    /// Members in declaration order
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn has_constructor(&self) -> bool {
        self.constructor.is_some()
    }

    /// Builds an empty instance
    ///
    /// Fails with [`GraphError::Construction`] when the type registered no
    /// constructor.
    pub fn construct(&self) -> Result<Box<dyn Reflect>, GraphError> {
        match &self.constructor {
            Some(make) => Ok(make()),
            None => Err(GraphError::Construction {
                type_name: self.info.name,
            }),
        }
    }
}

impl fmt::Debug for CompositeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeDescriptor")
            .field("name", &self.info.name)
            .field("constructor", &self.constructor.is_some())
            .field("members", &self.members)
            .finish()
    }
}

/// Builder for [`CompositeDescriptor`]
pub struct CompositeBuilder<S> {
    constructor: Option<Constructor>,
    members: Vec<Member>,
    _owner: PhantomData<fn() -> S>,
}

impl<S: Typed> CompositeBuilder<S> {
    /// Registers the function producing an empty instance
    pub fn constructor(mut self, make: fn() -> S) -> Self {
        self.constructor = Some(Box::new(move || -> Box<dyn Reflect> { Box::new(make()) }));
        self
    }

    /// Adds a required member
    pub fn member<F: Typed>(
        mut self,
        name: &'static str,
        get: fn(&S) -> &F,
        get_mut: fn(&mut S) -> &mut F,
    ) -> Self {
        self.members.push(Member {
            name,
            declared: F::static_info(),
            optional: false,
            access: Box::new(Required { name, get, get_mut }),
        });
        self
    }

    /// Adds a member that may be absent
    pub fn optional<F: Typed>(
        mut self,
        name: &'static str,
        get: fn(&S) -> &Option<F>,
        get_mut: fn(&mut S) -> &mut Option<F>,
    ) -> Self {
        self.members.push(Member {
            name,
            declared: F::static_info(),
            optional: true,
            access: Box::new(Optional { get, get_mut }),
        });
        self
    }

    pub fn build(self) -> CompositeDescriptor {
        CompositeDescriptor {
            info: S::static_info(),
            constructor: self.constructor,
            members: self.members,
        }
    }
}

/// Implements `Reflect` and `Typed` for types that implement [`Composite`]
#[macro_export]
macro_rules! reflect_composite {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::engine::Reflect for $ty {
                $crate::__reflect_any!();

                fn as_composite(
                    &self,
                ) -> ::std::option::Option<&'static $crate::engine::CompositeDescriptor> {
                    ::std::option::Option::Some(<$ty as $crate::engine::Composite>::descriptor())
                }
            }

            impl $crate::engine::Typed for $ty {
                fn static_info() -> $crate::engine::TypeInfo {
                    $crate::engine::TypeInfo::of::<$ty>($crate::engine::Capabilities::COMPOSITE)
                }
            }
        )+
    };
}
