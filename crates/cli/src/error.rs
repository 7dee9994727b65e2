//! Command-line error type, categories and exit codes.

use colored::Colorize;
use dc_core::config::ConfigError;
use dc_core::{ComposerError, PipelineError};
use std::io::Write;
use thiserror::Error;

/// Everything that can end a command-line invocation unsuccessfully.
#[derive(Error, Debug)]
pub enum CliError {
    /// The arguments did not parse.
    #[error("{0}")]
    Usage(clap::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The pipeline factory failed.
    #[error("Pipeline factory '{factory}' failed: {source}")]
    Registration {
        factory: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Pipeline '{name}' not found. Available pipelines: {}", display_list(.available))]
    PipelineNotFound { name: String, available: Vec<String> },

    #[error("Pipeline '{0}' is private and cannot be executed from the command line")]
    PrivatePipeline(String),

    /// A token names neither a declared input nor a configuration key.
    #[error(
        "Unknown parameter '{key}' for pipeline '{pipeline}'. Inputs: {}. Config keys: {}",
        display_list(.inputs),
        display_list(.config_keys)
    )]
    UnknownParameter {
        key: String,
        pipeline: String,
        inputs: Vec<String>,
        config_keys: Vec<String>,
    },

    /// A token names both a declared input and a configuration key.
    #[error(
        "Parameter '{key}' is both an input of pipeline '{pipeline}' and a config key; \
         prefix it with 'input:' or 'config:'"
    )]
    AmbiguousParameter { key: String, pipeline: String },

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    /// Two commands were registered under one name.
    #[error("Command '{0}' is registered more than once")]
    DuplicateCommand(String),

    #[error("Plugin '{command}' failed: {source}")]
    Plugin {
        command: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Shell failed: {0}")]
    Shell(#[source] anyhow::Error),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<ComposerError> for CliError {
    fn from(err: ComposerError) -> Self {
        match err {
            ComposerError::Config(err) => Self::Config(err),
            ComposerError::Registration { factory, source } => {
                Self::Registration { factory, source }
            }
        }
    }
}

impl CliError {
    /// Short category shown as `error[<category>]`.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Usage(_) => "usage",
            Self::Config(ConfigError::OverrideParse { .. }) => "override",
            Self::Config(ConfigError::SchemaValidation(_)) => "schema",
            Self::Config(_) => "config",
            Self::Registration { .. } => "registration",
            Self::PipelineNotFound { .. } | Self::PrivatePipeline(_) => "pipeline",
            Self::UnknownParameter { .. } | Self::AmbiguousParameter { .. } => "parameter",
            Self::Pipeline(_) => "execution",
            Self::DuplicateCommand(_) => "build",
            Self::Plugin { .. } => "plugin",
            Self::Shell(_) => "shell",
            Self::Io(_) | Self::Json(_) => "output",
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => 2,
            Self::Config(ConfigError::OverrideParse { .. }) => 4,
            Self::Config(ConfigError::SchemaValidation(_)) => 5,
            Self::Config(_) => 3,
            Self::UnknownParameter { .. } | Self::AmbiguousParameter { .. } => 6,
            Self::Registration { .. } => 7,
            Self::Pipeline(_) => 8,
            Self::PipelineNotFound { .. } | Self::PrivatePipeline(_) => 9,
            Self::DuplicateCommand(_)
            | Self::Plugin { .. }
            | Self::Shell(_)
            | Self::Io(_)
            | Self::Json(_) => 1,
        }
    }
}

fn display_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Print `err` as `error[<category>]: <message>`.
///
/// With `debug`, every underlying cause follows on its own line.
pub fn report_error(err: &CliError, debug: bool, out: &mut dyn Write) -> std::io::Result<()> {
    if let CliError::Usage(clap_err) = err {
        return write!(out, "{}", clap_err.render());
    }

    writeln!(
        out,
        "{}: {err}",
        format!("error[{}]", err.category()).red().bold()
    )?;
    if debug {
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            writeln!(out, "  {} {cause}", "caused by:".yellow())?;
            source = cause.source();
        }
    }
    Ok(())
}
