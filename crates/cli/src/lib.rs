//! Command-line front end for dag-composer.
//!
//! [`CliBuilder`] turns a [`Composer`](dc_core::Composer) into a command line
//! with `list`, `run` and `shell` subcommands plus any number of plugin
//! commands. `run` sorts its `key=value` parameters into runtime inputs and
//! configuration overrides, see [`reconcile`].

pub mod args;
pub mod builder;
pub mod commands;
pub mod context;
pub mod demo;
pub mod error;
pub mod logging;
pub mod plugin;
pub mod reconcile;
pub mod repl;

pub use builder::{Cli, CliBuilder};
pub use context::AppContext;
pub use error::{report_error, CliError};
pub use plugin::{FnPlugin, PluginCommand};
pub use repl::{ReplShell, Shell, ShellFlow, ShellSession};
