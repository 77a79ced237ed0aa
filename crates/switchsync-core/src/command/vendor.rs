// ── Per-vendor line generators ──
//
// Referenced from the dialect table. Line order is significant: devices
// apply lines top to bottom, so stale VLAN membership is always cleared
// before the new one is written.

use crate::command::requests::InterfaceChangeRequest;
use crate::dialect::{DialectSpec, Vocabulary};
use crate::error::CommandGenError;
use crate::model::PortMode;

const ETHERNET_SWITCHING: &str = "unit 0 family ethernet-switching";

fn is_valid_vlan(vlan: u16) -> bool {
    (1..4096).contains(&vlan)
}

fn access_vlan(request: &InterfaceChangeRequest) -> Result<u16, CommandGenError> {
    let vlan = request.vlan.ok_or(CommandGenError::MissingAccessVlan)?;
    if !is_valid_vlan(vlan) {
        return Err(CommandGenError::InvalidVlan { vlan });
    }
    Ok(vlan)
}

fn allowed_vlans(request: &InterfaceChangeRequest) -> Result<&[u16], CommandGenError> {
    if request.allowed_vlans.is_empty() {
        return Err(CommandGenError::MissingAllowedVlans);
    }
    if let Some(&vlan) = request.allowed_vlans.iter().find(|v| !is_valid_vlan(**v)) {
        return Err(CommandGenError::InvalidVlan { vlan });
    }
    Ok(&request.allowed_vlans)
}

/// Native VLAN, only when it is a usable VLAN id.
fn native_vlan(request: &InterfaceChangeRequest) -> Option<u16> {
    request.native_vlan.filter(|v| is_valid_vlan(*v))
}

// ── Cisco IOS / NX-OS ────────────────────────────────────────────────

pub(crate) fn switchport_lines(
    _spec: &DialectSpec,
    port: &str,
    request: &InterfaceChangeRequest,
) -> Result<Vec<String>, CommandGenError> {
    let mut lines = vec![format!("interface {port}")];
    match request.description.as_deref().map(str::trim) {
        None => {}
        Some("") => lines.push("no description".into()),
        Some(description) => lines.push(format!("description {description}")),
    }

    match request.mode {
        PortMode::Access => {
            let vlan = access_vlan(request)?;
            lines.extend([
                "no switchport trunk native vlan".into(),
                "no switchport trunk allowed vlan".into(),
                "switchport mode access".into(),
                format!("switchport access vlan {vlan}"),
            ]);
        }
        PortMode::Trunk => {
            let allowed = allowed_vlans(request)?;
            lines.push("no switchport access vlan".into());
            lines.push("switchport mode trunk".into());
            if let Some(native) = native_vlan(request) {
                lines.push(format!("switchport trunk native vlan {native}"));
            }
            // The first VLAN replaces the list, the rest extend it.
            for (idx, vlan) in allowed.iter().enumerate() {
                if idx == 0 {
                    lines.push(format!("switchport trunk allowed vlan {vlan}"));
                } else {
                    lines.push(format!("switchport trunk allowed vlan add {vlan}"));
                }
            }
        }
    }

    Ok(lines)
}

// ── Junos ────────────────────────────────────────────────────────────

pub(crate) fn junos_lines(
    spec: &DialectSpec,
    port: &str,
    request: &InterfaceChangeRequest,
) -> Result<Vec<String>, CommandGenError> {
    let (mode_keyword, native_vlan_path) = match spec.vocabulary {
        Vocabulary::Junos {
            mode_keyword,
            native_vlan_path,
        } => (mode_keyword, native_vlan_path),
        Vocabulary::Switchport => ("port-mode", "native-vlan-id"),
    };

    // Validate before emitting anything so no partial list escapes.
    let members: Vec<u16> = match request.mode {
        PortMode::Access => vec![access_vlan(request)?],
        PortMode::Trunk => allowed_vlans(request)?.to_vec(),
    };

    let prefix = format!("set interfaces {port}");
    let mut lines = vec![format!("delete interfaces {port}")];

    // `delete` drops the old description, so only a non-empty one is set.
    let description = request.description.as_deref().map_or("", str::trim);
    if !description.is_empty() {
        lines.push(format!(
            "{prefix} description \"{}\"",
            description.replace('"', "'")
        ));
    }
    lines.push(format!(
        "{prefix} {ETHERNET_SWITCHING} {mode_keyword} {}",
        request.mode
    ));
    for vlan in members {
        lines.push(format!("{prefix} {ETHERNET_SWITCHING} vlan members {vlan}"));
    }
    if request.mode == PortMode::Trunk {
        if let Some(native) = native_vlan(request) {
            lines.push(format!("{prefix} {native_vlan_path} {native}"));
        }
    }

    Ok(lines)
}
