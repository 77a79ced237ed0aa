//! Group command runner.

use serde::Serialize;
use tabled::Tabled;

use switchsync_core::{GroupCommand, GroupResults};

use crate::cli::{GlobalOpts, OutputFormat, RunArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct RunOutcome {
    device: String,
    ok: bool,
    output: String,
}

#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Output")]
    output: String,
}

fn outcomes(results: GroupResults) -> Vec<RunOutcome> {
    results
        .into_iter()
        .map(|(device, result)| match result {
            Ok(output) => RunOutcome {
                device,
                ok: true,
                output,
            },
            Err(e) => RunOutcome {
                device,
                ok: false,
                output: e.to_string(),
            },
        })
        .collect()
}

/// Per-device sections, for output too long to sit in a table cell.
fn sections(outcomes: &[RunOutcome], color: bool) -> String {
    outcomes
        .iter()
        .map(|o| {
            format!(
                "── {} ({}) ──\n{}",
                o.device,
                output::outcome(o.ok, color),
                o.output
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub async fn handle(ctx: &Context, args: RunArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let command = if args.config {
        GroupCommand::Config(args.commands)
    } else {
        GroupCommand::Show(args.commands.join(" "))
    };

    let results = ctx.engine.run_group_command(&args.group, &command).await?;
    let total = results.len();
    let outcomes = outcomes(results);
    let failed = outcomes.iter().filter(|o| !o.ok).count();

    let color = output::should_color(&global.color);
    let multiline = outcomes.iter().any(|o| o.output.contains('\n'));
    let out = if matches!(global.output, OutputFormat::Table) && multiline {
        sections(&outcomes, color)
    } else {
        output::render_list(
            &global.output,
            &outcomes,
            |o| RunRow {
                device: o.device.clone(),
                result: output::outcome(o.ok, color),
                output: o.output.clone(),
            },
            |o| format!("{} {}", o.device, if o.ok { "ok" } else { "failed" }),
        )
    };
    output::print_output(&out, global.quiet);

    if failed > 0 {
        return Err(CliError::PartialFailure { failed, total });
    }
    Ok(())
}
