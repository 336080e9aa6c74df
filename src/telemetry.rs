//! Logging initialization.
//!
//! Events go to stderr so command output on stdout stays machine-readable.
//! The filter comes from `RUST_LOG` when set, otherwise from the `[log]`
//! config section; `--verbose` forces `debug`.

use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::EnvFilter;

use crate::storage::{LogConfig, LogFormat};

/// Picks the filter directive: `RUST_LOG`, then `--verbose`, then config
fn filter(config: &LogConfig, verbose: bool) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    let level = if verbose { "debug" } else { config.level.as_str() };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Installs the global subscriber
///
/// Safe to call more than once; later calls leave the first subscriber in place.
pub fn init(config: &LogConfig, verbose: bool) {
    let filter = filter(config, verbose);

    let installed = match config.format {
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false),
            )
            .try_init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}
