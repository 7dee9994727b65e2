//! Tracing subscriber setup for generated command lines.

use anyhow::{Context as _, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const MAX_LOG_FILES: usize = 10;

/// Default filter directive for the given verbosity.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Daily-rotating appender writing next to `path`.
///
/// The file stem becomes the prefix and the extension the suffix, so
/// `logs/app.log` rotates as `logs/app.<date>.log`.
fn file_appender(path: &Path) -> Result<RollingFileAppender> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let prefix = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .with_context(|| format!("Invalid log file name: {}", path.display()))?;

    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(prefix);
    if let Some(suffix) = path.extension().and_then(|ext| ext.to_str()) {
        builder = builder.filename_suffix(suffix);
    }
    builder
        .build(dir)
        .with_context(|| format!("Failed to create log file appender in {}", dir.display()))
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the `--debug` default. Events go to stderr and, when
/// `log_file` is set, to a daily-rotating file without colors. Calling this
/// more than once keeps the first subscriber.
///
/// # Errors
///
/// Fails when the log file cannot be opened. The stderr subscriber is
/// installed before the error is returned.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(debug)))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(debug);

    let (file_layer, file_error) = match log_file.map(file_appender) {
        Some(Ok(appender)) => (
            Some(fmt::layer().with_writer(appender).with_ansi(false)),
            None,
        ),
        Some(Err(err)) => (None, Some(err)),
        None => (None, None),
    };

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();
    if initialized.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }

    match file_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
