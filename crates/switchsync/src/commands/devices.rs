//! Device command handlers.

use std::sync::Arc;

use tabled::Tabled;

use switchsync_core::{AddDeviceRequest, Device, UpdateDeviceRequest};

use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::{sync, util};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Platform")]
    platform: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Groups")]
    groups: String,
    #[tabled(rename = "Last Sync")]
    last_synced: String,
}

impl From<&Arc<Device>> for DeviceRow {
    fn from(d: &Arc<Device>) -> Self {
        Self {
            id: d.id.to_string(),
            hostname: d.hostname.clone(),
            address: d.address.clone(),
            platform: d.platform.to_string(),
            model: d.model.clone().unwrap_or_default(),
            groups: d.groups.join(","),
            last_synced: d.last_synced.map_or_else(
                || "never".into(),
                |t| t.format("%Y-%m-%d %H:%M").to_string(),
            ),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("ID:          {}", d.id),
        format!("Hostname:    {}", d.hostname),
        format!(
            "Address:     {}{}",
            d.address,
            d.port.map(|p| format!(":{p}")).unwrap_or_default()
        ),
        format!("Platform:    {}", d.platform),
        format!("Model:       {}", util::or_dash(d.model.as_deref())),
        format!("Vendor:      {}", util::or_dash(d.vendor.as_deref())),
        format!("OS Version:  {}", util::or_dash(d.os_version.as_deref())),
        format!("Serial:      {}", util::or_dash(d.serial_number.as_deref())),
        format!("Type:        {}", util::or_dash(d.device_type.as_deref())),
        format!("Description: {}", util::or_dash(d.description.as_deref())),
        format!("Credential:  {}", util::or_dash(d.credential.as_deref())),
        format!(
            "Groups:      {}",
            if d.groups.is_empty() { "-".into() } else { d.groups.join(", ") }
        ),
        format!(
            "Last Sync:   {}",
            d.last_synced.map_or_else(|| "never".into(), |t| t.to_rfc3339())
        ),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &Context, args: DevicesArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { group } => {
            let devices: Vec<Arc<Device>> = ctx
                .engine
                .devices()
                .iter()
                .filter(|d| group.as_deref().is_none_or(|g| d.in_group(g)))
                .cloned()
                .collect();
            let out = output::render_list(
                &global.output,
                &devices,
                |d| DeviceRow::from(d),
                |d| d.hostname.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Get { device } => {
            let device = util::resolve_device(ctx, &device)?;
            let out = output::render_single(&global.output, &*device, detail, |d| {
                d.hostname.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Add {
            hostname,
            address,
            platform,
            model,
            port,
            credential,
            groups,
            description,
            device_type,
        } => {
            let device = ctx.engine.add_device(AddDeviceRequest {
                hostname,
                address,
                port,
                platform: util::platform(platform),
                model,
                credential,
                groups,
                description,
                device_type,
            })?;
            ctx.save()?;
            let out = output::render_single(&global.output, &device, detail, |d| d.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Update {
            device,
            address,
            platform,
            model,
            port,
            credential,
            groups,
            description,
            device_type,
        } => {
            let updated = ctx.engine.update_device(
                &device,
                UpdateDeviceRequest {
                    address,
                    port,
                    platform: platform.map(util::platform),
                    model,
                    credential,
                    groups,
                    description,
                    device_type,
                },
            )?;
            ctx.save()?;
            let out = output::render_single(&global.output, &updated, detail, |d| {
                d.hostname.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        DevicesCommand::Remove { device } => {
            let target = util::resolve_device(ctx, &device)?;
            let prompt = format!("Remove {} and all of its collected data?", target.hostname);
            if !util::confirm(&prompt, global.yes)? {
                return Ok(());
            }
            let removed = ctx.engine.remove_device(&target.hostname)?;
            ctx.save()?;
            if !global.quiet {
                eprintln!("Removed {}", removed.hostname);
            }
            Ok(())
        }

        DevicesCommand::Sync { device } => sync::sync_one(ctx, &device, global).await,
    }
}
