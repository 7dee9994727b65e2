use clap::{Arg, ArgAction, Command};
use dc_cli::{CliBuilder, FnPlugin};
use std::process::ExitCode;

fn main() -> ExitCode {
    let describe = FnPlugin::new(
        Command::new("describe")
            .about("Show the inputs, outputs and graph of a pipeline")
            .arg(Arg::new("pipeline").required(true))
            .arg(
                Arg::new("dot")
                    .long("dot")
                    .action(ArgAction::SetTrue)
                    .help("Print the execution graph in DOT format"),
            ),
        |ctx, matches, out| {
            let name = matches
                .get_one::<String>("pipeline")
                .map(String::as_str)
                .unwrap_or_default();
            let registry = ctx.find_pipelines(None)?;
            let pipeline = registry
                .get(name)
                .ok_or_else(|| anyhow::anyhow!("Pipeline '{name}' not found"))?;

            if matches.get_flag("dot") {
                write!(out, "{}", pipeline.visualize_execution()?)?;
                return Ok(());
            }
            let summary = pipeline.summary()?;
            writeln!(out, "{}", summary.name)?;
            writeln!(out, "  description: {}", summary.display_description())?;
            writeln!(out, "  outputs: {}", summary.final_vars.join(", "))?;
            writeln!(out, "  inputs: {}", summary.required_inputs.join(", "))?;
            writeln!(out, "  public: {}", summary.public)?;
            Ok(())
        },
    );

    let cli = CliBuilder::new("dag-composer", dc_cli::demo::composer())
        .help("Compose, list and run configuration-driven dataflow pipelines")
        .version(env!("CARGO_PKG_VERSION"))
        .plugin(describe);

    match cli.build() {
        Ok(cli) => cli.main(),
        Err(err) => {
            let _ = dc_cli::report_error(&err, false, &mut std::io::stderr());
            ExitCode::from(err.exit_code())
        }
    }
}
