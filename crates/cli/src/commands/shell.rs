use crate::context::AppContext;
use crate::error::CliError;
use crate::reconcile::{parse_tokens, Assignment, Scope};
use crate::repl::{Shell, ShellSession};
use std::sync::Arc;

/// Resolve configuration with `tokens` as overrides and hand the session to
/// `shell`.
///
/// Only configuration overrides are accepted here; `input:` tokens have no
/// pipeline to bind to.
pub fn shell(ctx: &AppContext, tokens: &[String], shell: &dyn Shell) -> Result<(), CliError> {
    let assignments = parse_tokens(tokens)?;
    if let Some(input) = assignments.iter().find(|a| a.scope == Scope::Input) {
        return Err(CliError::UnknownParameter {
            key: input.key.clone(),
            pipeline: "shell".to_string(),
            inputs: Vec::new(),
            config_keys: Vec::new(),
        });
    }

    let resolved = if assignments.is_empty() {
        ctx.resolve()?
    } else {
        let overrides: Vec<String> = assignments.iter().map(Assignment::override_token).collect();
        ctx.composer().resolve(&ctx.options_with(&overrides))?
    };

    let session = ShellSession {
        config: resolved.config,
        registry: resolved.registry,
        composer: Arc::clone(ctx.composer()),
    };
    tracing::debug!(pipelines = session.registry.len(), "launching shell");
    shell.launch(session).map_err(CliError::Shell)
}
