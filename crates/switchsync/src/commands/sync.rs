//! Sync command handlers.

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tabled::Tabled;
use tokio_util::sync::CancellationToken;

use switchsync_core::{SyncReport, SyncResults};

use crate::cli::{GlobalOpts, SyncArgs};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

// ── Outcome view ────────────────────────────────────────────────────

/// One device's sync outcome, flattened for output.
#[derive(Serialize)]
struct SyncOutcome {
    device: String,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<SyncReport>,
}

#[derive(Tabled)]
struct SyncRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Result")]
    result: String,
    #[tabled(rename = "Interfaces")]
    interfaces: String,
    #[tabled(rename = "MACs")]
    macs: String,
    #[tabled(rename = "ARP")]
    arps: String,
    #[tabled(rename = "IP")]
    ip_interfaces: String,
    #[tabled(rename = "Error")]
    error: String,
}

fn row(o: &SyncOutcome, color: bool) -> SyncRow {
    let count = |f: fn(&SyncReport) -> usize| {
        o.report
            .as_ref()
            .map_or_else(|| "-".into(), |r| f(r).to_string())
    };
    SyncRow {
        device: o.device.clone(),
        result: output::outcome(o.ok, color),
        interfaces: count(|r| r.interfaces.changed()),
        macs: count(|r| r.macs.changed()),
        arps: count(|r| r.arps.changed()),
        ip_interfaces: count(|r| r.ip_interfaces.changed()),
        error: match (&o.stage, &o.error) {
            (Some(stage), Some(error)) => format!("{stage}: {error}"),
            _ => String::new(),
        },
    }
}

fn outcomes(results: SyncResults) -> Vec<SyncOutcome> {
    results
        .into_iter()
        .map(|(device, result)| match result {
            Ok(report) => SyncOutcome {
                device,
                ok: true,
                stage: None,
                error: None,
                report: Some(report),
            },
            Err(e) => SyncOutcome {
                device,
                ok: false,
                stage: Some(e.stage.to_string()),
                error: Some(e.source.to_string()),
                report: None,
            },
        })
        .collect()
}

fn detail(report: &SyncReport) -> String {
    let kind = |name: &str, s: &switchsync_core::ReconcileSummary| {
        format!(
            "{name:<14}{} new, {} updated, {} unchanged",
            s.inserted, s.updated, s.unchanged
        )
    };
    let mut lines = vec![
        format!("Synced {}", report.device.hostname),
        kind("Interfaces:", &report.interfaces),
        kind("MACs:", &report.macs),
        kind("ARP:", &report.arps),
        kind("IP:", &report.ip_interfaces),
    ];
    if !report.parse_errors.is_empty() {
        lines.push(format!(
            "Skipped {} unparseable line(s); rerun with -vv to see them",
            report.parse_errors.len()
        ));
    }
    lines.join("\n")
}

// ── Progress ────────────────────────────────────────────────────────

fn spinner(global: &GlobalOpts, message: String) -> Option<ProgressBar> {
    if global.quiet || !std::io::stderr().is_terminal() {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{elapsed}]") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

// ── Handlers ────────────────────────────────────────────────────────

/// Sync a single device and print its report.
pub async fn sync_one(ctx: &Context, device: &str, global: &GlobalOpts) -> Result<(), CliError> {
    let progress = spinner(global, format!("syncing {device}"));
    let result = ctx.engine.sync_device(device).await;
    if let Some(bar) = progress {
        bar.finish_and_clear();
    }

    // Metadata and rows from earlier stages are kept even on failure.
    ctx.save()?;
    let report = result.map_err(|e| CliError::from(e).on_device(device))?;
    let out = output::render_single(&global.output, &report, detail, |r| {
        r.device.hostname.clone()
    });
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(ctx: &Context, args: SyncArgs, global: &GlobalOpts) -> Result<(), CliError> {
    if let Some(every) = args.interval {
        return periodic(ctx, Duration::from_secs(every), global).await;
    }

    if let [device] = args.devices.as_slice() {
        return sync_one(ctx, device, global).await;
    }

    let results = if args.all {
        let progress = spinner(global, format!("syncing {} devices", ctx.engine.devices().len()));
        let results = ctx.engine.sync_all_devices().await;
        if let Some(bar) = progress {
            bar.finish_and_clear();
        }
        results
    } else {
        let mut results = SyncResults::new();
        for device in &args.devices {
            let outcome = ctx.engine.sync_device(device).await;
            results.insert(device.clone(), outcome);
        }
        results
    };

    ctx.save()?;
    report_all(results, global)
}

fn report_all(results: SyncResults, global: &GlobalOpts) -> Result<(), CliError> {
    let total = results.len();
    let outcomes = outcomes(results);
    let failed = outcomes.iter().filter(|o| !o.ok).count();

    let color = output::should_color(&global.color);
    let out = output::render_list(
        &global.output,
        &outcomes,
        |o| row(o, color),
        |o| format!("{} {}", o.device, if o.ok { "ok" } else { "failed" }),
    );
    output::print_output(&out, global.quiet);

    if failed > 0 {
        return Err(CliError::PartialFailure { failed, total });
    }
    Ok(())
}

/// Re-sync everything on an interval until Ctrl-C.
async fn periodic(ctx: &Context, every: Duration, global: &GlobalOpts) -> Result<(), CliError> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    if !global.quiet {
        eprintln!("Syncing every {}s; press Ctrl-C to stop", every.as_secs());
    }

    let mut save_error = None;
    ctx.engine
        .run_periodic(every, &cancel, |results| {
            if let Err(e) = ctx.save() {
                tracing::warn!(error = %e, "could not save inventory");
                save_error = Some(e);
                cancel.cancel();
                return;
            }
            let failed = results.values().filter(|r| r.is_err()).count();
            for (device, result) in results {
                if let Err(e) = result {
                    tracing::warn!(device = %device, stage = %e.stage, error = %e.source, "sync failed");
                }
            }
            if !global.quiet {
                eprintln!(
                    "{} synced {}/{} devices",
                    chrono::Local::now().format("%H:%M:%S"),
                    results.len() - failed,
                    results.len()
                );
            }
        })
        .await;

    save_error.map_or(Ok(()), Err)
}
