//! model-graph - Descriptor-driven deep copy, equality and merge
//!
//! Business records publish a table of their members; one engine walks any
//! such graph to copy it, compare it or merge another graph into it in place.
//! The `mgraph` binary applies the same operations to record files.

pub mod engine;
pub mod model;
pub mod storage;
pub mod cli;
pub mod telemetry;

pub use engine::{copy, equal, merge, Engine, EngineOptions, GraphError};
pub use model::{Address, Company, Person, Record, RecordKind, Role, User};
