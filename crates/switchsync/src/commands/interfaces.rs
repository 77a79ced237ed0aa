//! Interface command handlers.

use std::sync::Arc;

use tabled::Tabled;

use switchsync_core::{CoreError, Dialect, InterfaceChangeRequest, InterfaceRecord, Stored};

use crate::cli::{GlobalOpts, InterfacesArgs, InterfacesCommand};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InterfaceRow {
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "VLAN")]
    vlan: String,
    #[tabled(rename = "Native")]
    native_vlan: String,
    #[tabled(rename = "Allowed")]
    allowed_vlan: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Duplex")]
    duplex: String,
    #[tabled(rename = "Description")]
    description: String,
}

fn row(r: &InterfaceRecord, color: bool) -> InterfaceRow {
    InterfaceRow {
        port: r.port.clone(),
        status: output::link_status(r.status, color),
        mode: r.mode.to_string(),
        vlan: r.vlan.clone(),
        native_vlan: r.native_vlan.clone(),
        allowed_vlan: r.allowed_vlan.clone(),
        speed: r.speed.clone(),
        duplex: r.duplex.clone(),
        description: r.description.clone(),
    }
}

fn detail(r: &Stored<InterfaceRecord>) -> String {
    [
        format!("Port:        {}", r.port),
        format!("Description: {}", util::or_dash(Some(r.description.as_str()))),
        format!("Status:      {} ({})", r.status, util::or_dash(Some(r.status_raw.as_str()))),
        format!("Mode:        {}", r.mode),
        format!("VLAN:        {}", r.vlan),
        format!("Native VLAN: {}", r.native_vlan),
        format!("Allowed:     {}", r.allowed_vlan),
        format!("Speed:       {}", r.speed),
        format!("Duplex:      {}", r.duplex),
        format!("Transceiver: {}", util::or_dash(Some(r.transceiver.as_str()))),
        format!("Updated:     {}", r.updated_at.to_rfc3339()),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &Context,
    args: InterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InterfacesCommand::List { device, up } => {
            let device = util::resolve_device(ctx, &device)?;
            let rows: Vec<Arc<Stored<InterfaceRecord>>> = ctx
                .engine
                .store()
                .interfaces_for(device.id)
                .into_iter()
                .filter(|r| !up || r.status.is_up())
                .collect();
            let color = output::should_color(&global.color);
            let out = output::render_list(
                &global.output,
                &rows,
                |r| row(r, color),
                |r| r.port.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Get { device, port } => {
            let device = util::resolve_device(ctx, &device)?;
            let port = Dialect::resolve(device.platform, device.model.as_deref())
                .spec()
                .normalize_port(&port);
            let record = ctx
                .engine
                .store()
                .interface(device.id, &port)
                .ok_or_else(|| CoreError::InterfaceNotFound {
                    device: device.hostname.clone(),
                    port,
                })?;
            let out = output::render_single(&global.output, &*record, detail, |r| r.port.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InterfacesCommand::Set {
            device,
            port,
            mode,
            vlan,
            native_vlan,
            allowed_vlans,
            description,
        } => {
            let request = InterfaceChangeRequest {
                description,
                mode: util::port_mode(mode),
                vlan,
                native_vlan,
                allowed_vlans,
            };
            let stored = ctx
                .engine
                .push_interface_change(&device, &port, &request)
                .await
                .map_err(|e| CliError::from(e).on_device(&device))?;
            ctx.save()?;
            let out = output::render_single(&global.output, &stored, detail, |r| r.port.clone());
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
