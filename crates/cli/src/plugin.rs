//! Plugin commands.
//!
//! Plugins are extra subcommands grouped under `plugins`. Each one
//! describes its own `clap` command and receives the same [`AppContext`] as
//! the built-in commands.

use crate::context::AppContext;
use clap::{ArgMatches, Command};
use std::io::Write;

/// A subcommand contributed by the application.
pub trait PluginCommand: Send + Sync {
    /// The command definition. Its name is the dispatch key.
    fn command(&self) -> Command;

    /// Run the command with its parsed arguments.
    fn run(&self, ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()>;
}

type Handler = dyn Fn(&AppContext, &ArgMatches, &mut dyn Write) -> anyhow::Result<()> + Send + Sync;

/// A plugin built from a command definition and a closure.
///
/// # Example
///
/// ```rust
/// use dc_cli::plugin::FnPlugin;
///
/// let plugin = FnPlugin::new(clap::Command::new("hello"), |ctx, _matches, out| {
///     writeln!(out, "hello from {}", ctx.name())?;
///     Ok(())
/// });
/// ```
pub struct FnPlugin {
    command: Command,
    handler: Box<Handler>,
}

impl FnPlugin {
    pub fn new<F>(command: Command, handler: F) -> Self
    where
        F: Fn(&AppContext, &ArgMatches, &mut dyn Write) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self {
            command,
            handler: Box::new(handler),
        }
    }
}

impl PluginCommand for FnPlugin {
    fn command(&self) -> Command {
        self.command.clone()
    }

    fn run(&self, ctx: &AppContext, matches: &ArgMatches, out: &mut dyn Write) -> anyhow::Result<()> {
        (self.handler)(ctx, matches, out)
    }
}
