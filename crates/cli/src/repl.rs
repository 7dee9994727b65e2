//! The interactive shell.
//!
//! `shell` hands a [`ShellSession`] to a [`Shell`]. The default
//! [`ReplShell`] reads lines with `rustyline` and evaluates them against the
//! session:
//!
//! ```text
//! list                     public pipelines
//! config                   resolved configuration as YAML
//! inputs <name>            required inputs of a pipeline
//! run <name> [k=v ...]     execute a pipeline with runtime inputs
//! help                     this text
//! exit | quit              leave the shell
//! ```

use crate::reconcile::{display_value, runtime_inputs};
use colored::Colorize;
use dc_core::config::dotlist::{parse_value, split_assignment};
use dc_core::{Composer, Registry, ResolvedConfig, ValueMap};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;
use std::sync::Arc;

const HELP: &str = "\
Commands:
  list                   List public pipelines
  config                 Show the resolved configuration
  inputs <name>          Show the required inputs of a pipeline
  run <name> [k=v ...]   Execute a pipeline with runtime inputs
  help                   Show this help
  exit                   Leave the shell";

/// Everything the shell needs: a finished configuration and its registry.
#[derive(Debug, Clone)]
pub struct ShellSession {
    pub config: Arc<ResolvedConfig>,
    pub registry: Arc<Registry>,
    pub composer: Arc<Composer>,
}

/// Whether the shell should keep reading after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellFlow {
    Continue,
    Exit,
}

impl ShellSession {
    /// Evaluate one line, writing results (and errors) to `out`.
    pub fn eval(&self, line: &str, out: &mut dyn Write) -> std::io::Result<ShellFlow> {
        let mut words = line.split_whitespace();
        let Some(command) = words.next() else {
            return Ok(ShellFlow::Continue);
        };
        let args: Vec<&str> = words.collect();

        match command {
            "exit" | "quit" => return Ok(ShellFlow::Exit),
            "help" => writeln!(out, "{HELP}")?,
            "list" => {
                for (name, pipeline) in self.registry.public() {
                    writeln!(
                        out,
                        "{}  {}",
                        name.cyan(),
                        pipeline.description().unwrap_or("No description provided")
                    )?;
                }
            }
            "config" => match self.config.to_yaml() {
                Ok(yaml) => write!(out, "{yaml}")?,
                Err(e) => writeln!(out, "{} {e}", "error:".red())?,
            },
            "inputs" => match args.first().and_then(|name| self.registry.get(name)) {
                Some(pipeline) => match pipeline.required_inputs() {
                    Ok(inputs) => {
                        for input in inputs {
                            writeln!(out, "{input}")?;
                        }
                    }
                    Err(e) => writeln!(out, "{} {e}", "error:".red())?,
                },
                None => writeln!(out, "{} usage: inputs <pipeline>", "error:".red())?,
            },
            "run" => self.run(&args, out)?,
            other => writeln!(
                out,
                "{} unknown command '{other}' (type 'help')",
                "error:".red()
            )?,
        }
        Ok(ShellFlow::Continue)
    }

    fn run(&self, args: &[&str], out: &mut dyn Write) -> std::io::Result<()> {
        let Some((name, tokens)) = args.split_first() else {
            return writeln!(out, "{} usage: run <pipeline> [key=value ...]", "error:".red());
        };
        let Some(pipeline) = self.registry.get(name) else {
            return writeln!(out, "{} pipeline '{name}' not found", "error:".red());
        };

        let mut explicit = ValueMap::new();
        for token in tokens {
            match split_assignment(token) {
                Ok((key, raw)) => {
                    explicit.insert(key.to_string(), parse_value(raw));
                }
                Err(e) => return writeln!(out, "{} {e}", "error:".red()),
            }
        }

        let required = match pipeline.required_inputs() {
            Ok(required) => required,
            Err(e) => return writeln!(out, "{} {e}", "error:".red()),
        };
        let inputs = runtime_inputs(&required, &self.config, &explicit);
        match pipeline.execute(&inputs) {
            Ok(values) => {
                for (var, value) in &values {
                    writeln!(out, "{var} = {}", display_value(value))?;
                }
                Ok(())
            }
            Err(e) => writeln!(out, "{} {e}", "error:".red()),
        }
    }
}

/// Receives a finished session and runs it until the user leaves.
pub trait Shell: Send + Sync {
    fn launch(&self, session: ShellSession) -> anyhow::Result<()>;
}

/// Line-editing shell on the terminal.
#[derive(Debug, Clone)]
pub struct ReplShell {
    prompt: String,
}

impl ReplShell {
    pub fn new(app_name: &str) -> Self {
        Self {
            prompt: format!("{app_name}> "),
        }
    }
}

impl Shell for ReplShell {
    fn launch(&self, session: ShellSession) -> anyhow::Result<()> {
        let mut editor = DefaultEditor::new()?;
        let mut stdout = std::io::stdout();
        writeln!(
            stdout,
            "{} pipelines loaded. Type 'help' for commands.",
            session.registry.len()
        )?;

        loop {
            match editor.readline(&self.prompt) {
                Ok(line) => {
                    if !line.trim().is_empty() {
                        editor.add_history_entry(line.as_str())?;
                    }
                    if session.eval(&line, &mut stdout)? == ShellFlow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}
