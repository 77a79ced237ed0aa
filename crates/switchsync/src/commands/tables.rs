//! Forwarding-table views: MAC, ARP and IP interface rows.

use std::sync::Arc;

use tabled::Tabled;

use switchsync_core::{ArpEntry, IpInterfaceEntry, MacTableEntry, Stored};

use crate::cli::{
    ArpsArgs, ArpsCommand, GlobalOpts, IpInterfacesArgs, IpInterfacesCommand, MacsArgs,
    MacsCommand,
};
use crate::config::Context;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct MacRow {
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "VLAN")]
    vlan: i64,
    #[tabled(rename = "Static")]
    is_static: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Moves")]
    moves: i64,
}

impl From<&MacTableEntry> for MacRow {
    fn from(e: &MacTableEntry) -> Self {
        Self {
            mac: e.mac.to_string(),
            interface: e.interface.clone(),
            vlan: e.vlan,
            is_static: yes_no(e.is_static),
            active: yes_no(e.active),
            moves: e.moves,
        }
    }
}

#[derive(Tabled)]
struct ArpRow {
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Age")]
    age: String,
}

impl From<&ArpEntry> for ArpRow {
    fn from(e: &ArpEntry) -> Self {
        Self {
            ip: e.ip.clone(),
            mac: e.mac.to_string(),
            interface: e.interface.clone(),
            age: format!("{:.0}s", e.age),
        }
    }
}

#[derive(Tabled)]
struct IpInterfaceRow {
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "IPv4")]
    ipv4: String,
}

impl From<&IpInterfaceEntry> for IpInterfaceRow {
    fn from(e: &IpInterfaceEntry) -> Self {
        Self {
            interface: e.interface.clone(),
            ipv4: util::or_dash(Some(e.ipv4.as_str())).to_owned(),
        }
    }
}

fn yes_no(value: bool) -> String {
    String::from(if value { "yes" } else { "no" })
}

// ── Handlers ────────────────────────────────────────────────────────

pub fn macs(ctx: &Context, args: MacsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let MacsCommand::List {
        device,
        vlan,
        interface,
    } = args.command;
    let device = util::resolve_device(ctx, &device)?;
    let rows: Vec<Arc<Stored<MacTableEntry>>> = ctx
        .engine
        .store()
        .macs_for(device.id)
        .into_iter()
        .filter(|e| vlan.is_none_or(|v| e.vlan == v))
        .filter(|e| {
            interface
                .as_deref()
                .is_none_or(|i| e.interface.eq_ignore_ascii_case(i))
        })
        .collect();
    let out = output::render_list(
        &global.output,
        &rows,
        |e| MacRow::from(&e.data),
        |e| e.mac.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn arps(ctx: &Context, args: ArpsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let ArpsCommand::List { device } = args.command;
    let device = util::resolve_device(ctx, &device)?;
    let rows = ctx.engine.store().arps_for(device.id);
    let out = output::render_list(
        &global.output,
        &rows,
        |e| ArpRow::from(&e.data),
        |e| e.ip.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn ip_interfaces(
    ctx: &Context,
    args: IpInterfacesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let IpInterfacesCommand::List { device } = args.command;
    let device = util::resolve_device(ctx, &device)?;
    let rows = ctx.engine.store().ip_interfaces_for(device.id);
    let out = output::render_list(
        &global.output,
        &rows,
        |e| IpInterfaceRow::from(&e.data),
        |e| e.interface.clone(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
