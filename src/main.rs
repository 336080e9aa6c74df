//! mgraph - Deep copy, compare and merge business records

use std::process::ExitCode;

/// Exit status for errors, kept apart from `equal`'s 1 for "different"
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    match model_graph::cli::run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
