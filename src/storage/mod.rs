//! # Storage Layer
//!
//! Persistence for configuration and record documents.
//!
//! ## Storage Formats
//!
//! | Data | Format | Location |
//! |------|--------|----------|
//! | Records | JSON, YAML or TOML (by extension) | any path |
//! | Project config | TOML | nearest `mgraph.toml` |
//! | Global config | TOML | `<config dir>/mgraph/config.toml` |
//!
//! ## Concurrency Safety
//!
//! - [`RecordFile`] takes a shared `fs2` lock for reads
//! - All record writes are atomic (locked temp file + rename)

mod config;
mod records;

pub use config::{
    Config, ConfigError, LogConfig, LogFormat, OutputConfig, OutputFormat, Settings, PROJECT_FILE,
};
pub use records::{RecordError, RecordFile, RecordFormat};
