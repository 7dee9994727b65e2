//! Argument definitions shared by every generated command line.

use clap::{Args, Subcommand};
use dc_core::config::LoadOptions;
use std::path::PathBuf;

/// Flags accepted before or after any subcommand.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Location of the configuration file for the project pipelines
    #[arg(short = 'c', long, global = true, value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    /// Search for the configuration file relative to the git root. Only used
    /// if the configuration file is a relative path
    #[arg(short = 'g', long, global = true)]
    pub search_git_root: bool,

    /// Search for the configuration file in parent directories. Only used if
    /// the configuration file is a relative path
    #[arg(short = 'r', long, global = true)]
    pub search_recursive: bool,

    /// Enable debug logging and full error reports
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,
}

impl GlobalArgs {
    /// Load options for these flags, falling back to `default_file`.
    pub fn load_options(&self, default_file: Option<PathBuf>) -> LoadOptions {
        LoadOptions {
            config_file: self.config_file.clone().or(default_file),
            search_git_root: self.search_git_root,
            search_recursive: self.search_recursive,
            overrides: Vec::new(),
        }
    }
}

/// Subcommands every application gets.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum BuiltinCommand {
    /// List available pipelines within the project
    List {
        /// Print pipeline summaries as JSON
        #[arg(long)]
        json: bool,
    },

    /// Execute a specific pipeline from the project
    ///
    /// Parameters are `key=value` pairs. Keys naming an input of the pipeline
    /// are passed to the execution; keys naming configuration entries are
    /// applied as overrides. Prefix a key with `input:` or `config:` to choose
    /// explicitly.
    Run {
        /// Name of the pipeline to execute
        pipeline: String,

        /// Print the execution summary as JSON
        #[arg(long)]
        json: bool,

        /// Input and configuration parameters (`key=value`)
        #[arg(value_name = "PARAMS")]
        params: Vec<String>,
    },

    /// Launch an interactive shell with the resolved configuration
    Shell {
        /// Configuration overrides (`key=value`)
        #[arg(value_name = "PARAMS")]
        params: Vec<String>,
    },
}
