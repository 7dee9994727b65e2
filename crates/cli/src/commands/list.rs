use crate::context::AppContext;
use crate::error::CliError;
use colored::Colorize;
use dc_protocol::PipelineSummary;
use std::io::Write;

const NAME_HEADER: &str = "NAME";
const DESCRIPTION_HEADER: &str = "DESCRIPTION";
const OUTPUTS_HEADER: &str = "OUTPUTS";

/// Print the public pipelines of the default registry. Nothing is executed.
///
/// The table needs metadata only. The JSON form also carries each
/// pipeline's required inputs when they can be determined.
pub fn list(ctx: &AppContext, json: bool, out: &mut dyn Write) -> Result<(), CliError> {
    let resolved = ctx.resolve()?;

    if json {
        let summaries = resolved.registry.summaries(true);
        writeln!(out, "{}", serde_json::to_string_pretty(&summaries)?)?;
        return Ok(());
    }

    let listings: Vec<PipelineSummary> = resolved
        .registry
        .public()
        .map(|(_, pipeline)| pipeline.listing())
        .collect();
    if listings.is_empty() {
        writeln!(out, "No pipelines available.")?;
        return Ok(());
    }
    write_table(&listings, out)?;
    Ok(())
}

fn write_table(summaries: &[PipelineSummary], out: &mut dyn Write) -> std::io::Result<()> {
    let name_width = summaries
        .iter()
        .map(|s| s.name.len())
        .chain([NAME_HEADER.len()])
        .max()
        .unwrap_or_default();
    let description_width = summaries
        .iter()
        .map(|s| s.display_description().len())
        .chain([DESCRIPTION_HEADER.len()])
        .max()
        .unwrap_or_default();

    writeln!(
        out,
        "{}",
        format!("{NAME_HEADER:<name_width$}  {DESCRIPTION_HEADER:<description_width$}  {OUTPUTS_HEADER}")
            .bold()
    )?;
    for summary in summaries {
        // Pad before coloring so escape codes do not count toward the width.
        let name = format!("{:<name_width$}", summary.name);
        writeln!(
            out,
            "{}  {:<description_width$}  {}",
            name.cyan(),
            summary.display_description(),
            summary.final_vars.join(", ")
        )?;
    }
    Ok(())
}
