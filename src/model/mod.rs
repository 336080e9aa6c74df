//! Business records
//!
//! Plain structs that publish member tables to the engine. Equality, deep
//! copies and in-place updates are all driven by the engine, so none of
//! these types carries hand-written comparison or cloning code.

mod address;
mod company;
mod person;
mod user;

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Composite, GraphError, Typed};

pub use address::Address;
pub use company::Company;
pub use person::Person;
pub use user::{Role, User};

/// Shared behavior of every business record
pub trait Record: Composite + Typed + Serialize + DeserializeOwned + Default {
    const KIND: RecordKind;

    /// Deep copy that fails if any subtree could not be reproduced
    fn duplicate(&self) -> Result<Self, GraphError> {
        engine::copy(self)?.strict()
    }

    /// Takes over every differing value from `source`, in place
    fn update(&mut self, source: &Self) -> Result<&mut Self, GraphError> {
        engine::merge(source, self)
    }
}

/// Implements the engine plumbing, `Record` and `PartialEq` for a record type
macro_rules! record {
    ($ty:ident, $kind:expr) => {
        $crate::reflect_composite!($ty);

        impl $crate::model::Record for $ty {
            const KIND: $crate::model::RecordKind = $kind;
        }

        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                $crate::engine::equal(self, other)
            }
        }
    };
}

pub(crate) use record;

/// Names a record type on the command line and in files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Address,
    Person,
    Company,
    User,
}

impl RecordKind {
    pub const ALL: [RecordKind; 4] = [
        RecordKind::Address,
        RecordKind::Person,
        RecordKind::Company,
        RecordKind::User,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Address => "address",
            RecordKind::Person => "person",
            RecordKind::Company => "company",
            RecordKind::User => "user",
        }
    }

    /// Member table of the record type
    pub fn descriptor(&self) -> &'static engine::CompositeDescriptor {
        match self {
            RecordKind::Address => Address::descriptor(),
            RecordKind::Person => Person::descriptor(),
            RecordKind::Company => Company::descriptor(),
            RecordKind::User => User::descriptor(),
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "address" | "addr" => Ok(RecordKind::Address),
            "person" => Ok(RecordKind::Person),
            "company" | "org" => Ok(RecordKind::Company),
            "user" => Ok(RecordKind::User),
            _ => Err(format!("Unknown record kind: {}", s)),
        }
    }
}
