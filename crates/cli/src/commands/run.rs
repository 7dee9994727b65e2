use crate::context::AppContext;
use crate::error::CliError;
use crate::reconcile::{display_value, parse_tokens, reconcile, runtime_inputs};
use dc_core::{PipelineError, ValueMap};
use std::io::Write;
use std::sync::Arc;

/// Execute one public pipeline.
///
/// The pipeline is looked up in the default registry before any token is
/// applied, so an unknown name fails without re-resolving configuration.
pub fn run(
    ctx: &AppContext,
    name: &str,
    tokens: &[String],
    json: bool,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    let assignments = parse_tokens(tokens)?;
    let resolved = ctx.resolve()?;

    let pipeline = resolved
        .registry
        .get(name)
        .ok_or_else(|| CliError::PipelineNotFound {
            name: name.to_string(),
            available: resolved.registry.public().map(|(n, _)| n.to_string()).collect(),
        })?;
    if !pipeline.is_public() {
        tracing::warn!(pipeline = name, "refusing to run private pipeline");
        return Err(CliError::PrivatePipeline(name.to_string()));
    }

    let required = pipeline.required_inputs()?;
    let reconciled = reconcile(
        name,
        &assignments,
        &required,
        &resolved.config,
        ctx.composer().resolver().schema(),
    )?;

    let (config, registry) = if reconciled.needs_reresolution() {
        tracing::debug!(overrides = ?reconciled.config_overrides, "re-resolving configuration");
        let config = ctx.load_config(&reconciled.config_overrides)?;
        let registry = ctx.find_pipelines(Some(&config))?;
        (Arc::new(config), registry)
    } else {
        (resolved.config.clone(), resolved.registry.clone())
    };
    // The factory may drop or hide a pipeline for the new configuration.
    let pipeline = match registry.get(name) {
        Some(pipeline) if pipeline.is_public() => pipeline,
        Some(_) => return Err(CliError::PrivatePipeline(name.to_string())),
        None => {
            return Err(CliError::PipelineNotFound {
                name: name.to_string(),
                available: registry.public().map(|(n, _)| n.to_string()).collect(),
            })
        }
    };

    let required = pipeline.required_inputs()?;
    let inputs = runtime_inputs(&required, &config, &reconciled.inputs);
    pipeline.validate_execution(&inputs, &ValueMap::new())?;

    if json {
        let mut report = pipeline.execute_partial(&inputs, &ValueMap::new());
        writeln!(out, "{}", serde_json::to_string_pretty(&report.to_summary(name))?)?;
        for var in pipeline.final_vars() {
            if let Some(source) = report.errors.remove(var) {
                return Err(PipelineError::Execution {
                    pipeline: name.to_string(),
                    variable: var.clone(),
                    source,
                }
                .into());
            }
        }
        return Ok(());
    }

    let values = pipeline.execute(&inputs)?;
    for var in pipeline.final_vars() {
        if let Some(value) = values.get(var) {
            writeln!(out, "{var} = {}", display_value(value))?;
        }
    }
    Ok(())
}
