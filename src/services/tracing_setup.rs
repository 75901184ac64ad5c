//! Tracing subscriber setup
//!
//! Shared between the `lsif-fs` binary and tests.

use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: RUST_LOG if set, otherwise `default_level`.
pub fn build_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Build a subscriber writing to `log_file`, or to stderr when `None`.
pub fn build_subscriber(
    log_file: Option<File>,
    default_level: &str,
) -> Box<dyn tracing::Subscriber + Send + Sync> {
    let env_filter = build_filter(default_level);

    match log_file {
        Some(file) => Box::new(
            tracing_subscriber::registry()
                .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
                .with(env_filter),
        ),
        None => Box::new(
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr))
                .with(env_filter),
        ),
    }
}

/// Install the global subscriber.
///
/// Logs go to `log_file_path` when given (the file is truncated), else stderr.
pub fn init_global(log_file_path: Option<&Path>, default_level: &str) -> std::io::Result<()> {
    let log_file = log_file_path.map(File::create).transpose()?;
    tracing::subscriber::set_global_default(build_subscriber(log_file, default_level))
        .map_err(std::io::Error::other)
}
