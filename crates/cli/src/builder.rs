//! Turning a [`Composer`] into a command line.

use crate::args::{BuiltinCommand, GlobalArgs};
use crate::commands;
use crate::context::AppContext;
use crate::error::{report_error, CliError};
use crate::logging::init_logging;
use crate::plugin::PluginCommand;
use crate::repl::{ReplShell, Shell};
use clap::error::ErrorKind;
use clap::{ArgMatches, Args, Command, FromArgMatches, Subcommand};
use dc_core::Composer;
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const PLUGINS_COMMAND: &str = "plugins";

/// Collects everything a [`Cli`] needs before the command tree is built.
///
/// # Example
///
/// ```rust
/// use dc_cli::CliBuilder;
/// use dc_core::{Composer, Registry};
///
/// let composer = Composer::new(|_config| Ok(Registry::new()));
/// let cli = CliBuilder::new("demo", composer)
///     .help("Demo pipelines")
///     .build()
///     .unwrap();
/// assert_eq!(cli.command().get_name(), "demo");
/// ```
pub struct CliBuilder {
    app_name: String,
    composer: Arc<Composer>,
    help: Option<String>,
    version: Option<String>,
    plugins: Vec<Box<dyn PluginCommand>>,
    shell: Option<Box<dyn Shell>>,
    log_file: Option<PathBuf>,
}

impl CliBuilder {
    pub fn new(app_name: impl Into<String>, composer: impl Into<Arc<Composer>>) -> Self {
        Self {
            app_name: app_name.into(),
            composer: composer.into(),
            help: None,
            version: None,
            plugins: Vec::new(),
            shell: None,
            log_file: None,
        }
    }

    /// Text shown at the top of `--help`.
    pub fn help(mut self, text: impl Into<String>) -> Self {
        self.help = Some(text.into());
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Add a command under `plugins`.
    pub fn plugin(mut self, plugin: impl PluginCommand + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Replace the interactive shell launched by `shell`.
    pub fn shell(mut self, shell: impl Shell + 'static) -> Self {
        self.shell = Some(Box::new(shell));
        self
    }

    /// Also write log events to `path`.
    pub fn log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// Assemble the command tree.
    ///
    /// # Errors
    ///
    /// [`CliError::DuplicateCommand`] when two plugins share a name.
    pub fn build(self) -> Result<Cli, CliError> {
        let mut command = Command::new(self.app_name.clone())
            .subcommand_required(true)
            .arg_required_else_help(true);
        if let Some(help) = &self.help {
            command = command.about(help.clone());
        }
        if let Some(version) = &self.version {
            command = command.version(version.clone());
        }
        command = GlobalArgs::augment_args(command);
        command = BuiltinCommand::augment_subcommands(command);

        if let Some(default_file) = self.composer.config_file() {
            let default_help = format!(
                "Location of the configuration file for the project pipelines [default: {}]",
                default_file.display()
            );
            command = command.mut_arg("config_file", |arg| arg.help(default_help));
        }

        let mut plugins = BTreeMap::new();
        let mut group = Command::new(PLUGINS_COMMAND)
            .about("Commands provided by the application")
            .subcommand_required(true)
            .arg_required_else_help(true);
        for plugin in self.plugins {
            let plugin_command = plugin.command();
            let name = plugin_command.get_name().to_string();
            if plugins.contains_key(&name) {
                return Err(CliError::DuplicateCommand(name));
            }
            group = group.subcommand(plugin_command);
            plugins.insert(name, plugin);
        }
        if !plugins.is_empty() {
            command = command.subcommand(group);
        }

        let shell: Box<dyn Shell> = match self.shell {
            Some(shell) => shell,
            None => Box::new(ReplShell::new(&self.app_name)),
        };

        Ok(Cli {
            app_name: self.app_name,
            composer: self.composer,
            command,
            plugins,
            shell,
            log_file: self.log_file,
        })
    }
}

/// A ready-to-run command line.
pub struct Cli {
    app_name: String,
    composer: Arc<Composer>,
    command: Command,
    plugins: BTreeMap<String, Box<dyn PluginCommand>>,
    shell: Box<dyn Shell>,
    log_file: Option<PathBuf>,
}

impl Cli {
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn composer(&self) -> &Arc<Composer> {
        &self.composer
    }

    /// Parse `args` (including the program name) and run the selected
    /// command, writing its output to `out`.
    ///
    /// `--help` and `--version` are rendered to `out` and count as success.
    pub fn run_from<I, T>(&self, args: I, out: &mut dyn Write) -> Result<(), CliError>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command.clone().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
                write!(out, "{}", err.render())?;
                return Ok(());
            }
            Err(err) => return Err(CliError::Usage(err)),
        };
        self.execute(&matches, out)
    }

    /// Run the command selected by already-parsed `matches`.
    pub fn execute(&self, matches: &ArgMatches, out: &mut dyn Write) -> Result<(), CliError> {
        let global = GlobalArgs::from_arg_matches(matches).map_err(CliError::Usage)?;
        let options = global.load_options(self.composer.config_file().map(PathBuf::from));
        let ctx = AppContext::new(&self.app_name, Arc::clone(&self.composer), options, global.debug);

        if let Some((PLUGINS_COMMAND, group)) = matches.subcommand() {
            return self.run_plugin(&ctx, group, out);
        }

        match BuiltinCommand::from_arg_matches(matches).map_err(CliError::Usage)? {
            BuiltinCommand::List { json } => commands::list(&ctx, json, out),
            BuiltinCommand::Run {
                pipeline,
                json,
                params,
            } => commands::run(&ctx, &pipeline, &params, json, out),
            BuiltinCommand::Shell { params } => commands::shell(&ctx, &params, self.shell.as_ref()),
        }
    }

    fn run_plugin(&self, ctx: &AppContext, group: &ArgMatches, out: &mut dyn Write) -> Result<(), CliError> {
        let Some((name, matches)) = group.subcommand() else {
            return Err(CliError::Usage(
                self.command
                    .clone()
                    .error(ErrorKind::MissingSubcommand, "a plugin command is required"),
            ));
        };
        let Some(plugin) = self.plugins.get(name) else {
            return Err(CliError::Usage(self.command.clone().error(
                ErrorKind::InvalidSubcommand,
                format!("unknown plugin command '{name}'"),
            )));
        };
        tracing::debug!(plugin = name, "dispatching plugin command");
        plugin
            .run(ctx, matches, out)
            .map_err(|source| CliError::Plugin {
                command: name.to_string(),
                source,
            })
    }

    /// Run against the process arguments and map the outcome to an exit code.
    pub fn main(&self) -> ExitCode {
        self.main_from(std::env::args_os())
    }

    /// Like [`Cli::main`] with explicit arguments.
    ///
    /// Output goes to stdout, error reports to stderr. Logging is initialised
    /// here, after the `--debug` flag is known.
    pub fn main_from<I, T>(&self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = match self.command.clone().try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(err) => {
                let _ = err.print();
                return ExitCode::from(u8::try_from(err.exit_code()).unwrap_or(2));
            }
        };

        let debug = matches.get_flag("debug");
        if let Err(err) = init_logging(debug, self.log_file.as_deref()) {
            eprintln!("warning: could not open log file: {err:#}");
        }
        // Panic reports only; command errors are printed below.
        let _ = color_eyre::install();

        let mut stdout = std::io::stdout().lock();
        match self.execute(&matches, &mut stdout) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                tracing::debug!(category = err.category(), "command failed");
                let _ = report_error(&err, debug, &mut std::io::stderr().lock());
                ExitCode::from(err.exit_code())
            }
        }
    }
}

impl std::fmt::Debug for Cli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cli")
            .field("app_name", &self.app_name)
            .field("composer", &self.composer)
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("log_file", &self.log_file)
            .finish_non_exhaustive()
    }
}
