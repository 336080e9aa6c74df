//! Main CLI application structure

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::record_cmd;
use crate::engine::Engine;
use crate::model::RecordKind;
use crate::storage::Config;
use crate::telemetry;

#[derive(Parser)]
#[command(name = "mgraph")]
#[command(author, version, about = "Deep copy, compare and merge business records")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the configured one)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Use this configuration file instead of discovering mgraph.toml
    #[arg(long, global = true, env = "MGRAPH_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the member table of a record type
    Members {
        /// Record type (address, person, company, user)
        kind: RecordKind,
    },

    /// Compare two record files structurally (exit code 1 when different, 2 on error)
    Equal {
        /// Record type (address, person, company, user)
        kind: RecordKind,

        /// First record file
        a: PathBuf,

        /// Second record file
        b: PathBuf,
    },

    /// Merge the values of one record file into another
    Merge {
        /// Record type (address, person, company, user)
        kind: RecordKind,

        /// Record providing the new values
        source: PathBuf,

        /// Record being updated
        target: PathBuf,

        /// Write the merged record back to the target file
        #[arg(long, short)]
        write: bool,
    },

    /// Deep-copy a record file
    Copy {
        /// Record type (address, person, company, user)
        kind: RecordKind,

        /// Record to copy
        file: PathBuf,

        /// Write the copy to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Main entry point for the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    telemetry::init(&config.settings.log, cli.verbose);

    let format = cli
        .format
        .unwrap_or_else(|| config.settings.output.format.into());
    let output = Output::new(format, cli.verbose);
    let engine = Engine::new(config.engine_options());

    output.verbose_ctx(
        "config",
        &format!(
            "Loaded from {:?}, max_depth={}, strict_copy={}",
            config.sources,
            engine.options().max_depth,
            engine.options().strict_copy
        ),
    );

    match cli.command {
        Commands::Members { kind } => {
            record_cmd::members(&output, kind);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Equal { kind, a, b } => record_cmd::equal(&output, &engine, kind, &a, &b),

        Commands::Merge {
            kind,
            source,
            target,
            write,
        } => {
            record_cmd::merge(&output, &engine, kind, &source, &target, write)?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Copy { kind, file, output: dest } => {
            record_cmd::copy(&output, &engine, kind, &file, dest.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}
