//! Shared helpers for command handlers.

use std::sync::Arc;

use switchsync_core::{Device, Platform, PortMode};

use crate::cli::{PlatformArg, PortModeArg};
use crate::config::Context;
use crate::error::CliError;

/// Resolve a device identifier (hostname or id).
pub fn resolve_device(ctx: &Context, identifier: &str) -> Result<Arc<Device>, CliError> {
    Ok(ctx.engine.device(identifier)?)
}

pub fn platform(arg: PlatformArg) -> Platform {
    match arg {
        PlatformArg::Ios => Platform::Ios,
        PlatformArg::Nxos => Platform::Nxos,
        PlatformArg::Junos => Platform::Junos,
    }
}

pub fn port_mode(arg: PortModeArg) -> PortMode {
    match arg {
        PortModeArg::Access => PortMode::Access,
        PortModeArg::Trunk => PortMode::Trunk,
    }
}

/// `-` for empty optional text in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::IsTerminal::is_terminal(&std::io::stdin()) {
        return Err(CliError::NonInteractiveRequiresYes {
            action: message.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}
