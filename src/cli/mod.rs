//! # Command-Line Interface
//!
//! User-facing `mgraph` commands and output formatting.
//!
//! ## Commands
//!
//! | Command | Purpose |
//! |---------|---------|
//! | `members <kind>` | Member table of a record type |
//! | `equal <kind> <a> <b>` | Structural comparison, exit code 1 when different, 2 on error |
//! | `merge <kind> <source> <target>` | In-place update, printed or written with `--write` |
//! | `copy <kind> <file>` | Deep copy, printed or written with `--output` |
//!
//! ## Output Formats
//!
//! All commands support `--format` flag:
//! - `text` (default) - Human-readable output
//! - `json` - Machine-parseable JSON
//!
//! ## Verbose Mode
//!
//! Use `--verbose` (or `-v`) for debug output:
//! ```bash
//! mgraph --verbose merge person new.json old.json
//! ```
//!
//! ## Entry Point
//!
//! Call [`run()`] to parse arguments and execute the appropriate command.

mod app;
mod output;
mod record_cmd;

pub use app::{run, Cli, Commands};
pub use output::{Output, OutputFormat};
