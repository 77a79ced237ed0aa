// ── Vendor command generation ──
//
// Turns an interface change request into the ordered configuration lines
// for the target device's dialect. Pure: no I/O, no partial output. Either
// the full line list comes back or a `CommandGenError` does.

pub mod requests;
mod vendor;

pub(crate) use vendor::{junos_lines, switchport_lines};

use serde::Serialize;

use crate::dialect::{Dialect, DialectSpec};
use crate::error::CommandGenError;
use crate::model::Device;
use requests::InterfaceChangeRequest;

/// Lines to push plus whether the dialect needs a commit afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandPlan {
    pub lines: Vec<String>,
    pub requires_commit: bool,
}

/// Generate the configuration lines for `request` on `device`'s `port`.
pub fn generate(
    device: &Device,
    port: &str,
    request: &InterfaceChangeRequest,
) -> Result<CommandPlan, CommandGenError> {
    let spec = Dialect::resolve(device.platform, device.model.as_deref()).spec();
    generate_for(spec, port, request)
}

/// Same as [`generate`], for an already-resolved dialect.
pub fn generate_for(
    spec: &DialectSpec,
    port: &str,
    request: &InterfaceChangeRequest,
) -> Result<CommandPlan, CommandGenError> {
    let port = spec.normalize_port(port);
    if port.is_empty() {
        return Err(CommandGenError::EmptyPort);
    }
    let lines = (spec.generate)(spec, &port, request)?;
    Ok(CommandPlan {
        lines,
        requires_commit: spec.requires_commit,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::PortMode;
    use pretty_assertions::assert_eq;

    fn trunk(allowed: &[u16], native: Option<u16>) -> InterfaceChangeRequest {
        InterfaceChangeRequest {
            description: Some("uplink".into()),
            mode: PortMode::Trunk,
            vlan: None,
            native_vlan: native,
            allowed_vlans: allowed.to_vec(),
        }
    }

    fn access(vlan: u16) -> InterfaceChangeRequest {
        InterfaceChangeRequest {
            description: Some("desk 12".into()),
            mode: PortMode::Access,
            vlan: Some(vlan),
            ..InterfaceChangeRequest::default()
        }
    }

    // ── Cisco ──

    #[test]
    fn cisco_trunk_allowed_list_uses_add_after_first() {
        let plan = generate_for(Dialect::CiscoNxos.spec(), "Eth1/1", &trunk(&[10, 20, 30], None))
            .unwrap();
        assert_eq!(
            plan.lines,
            vec![
                "interface Ethernet1/1",
                "description uplink",
                "no switchport access vlan",
                "switchport mode trunk",
                "switchport trunk allowed vlan 10",
                "switchport trunk allowed vlan add 20",
                "switchport trunk allowed vlan add 30",
            ]
        );
        assert!(!plan.requires_commit);
    }

    #[test]
    fn cisco_trunk_native_vlan_precedes_allowed_list() {
        let plan =
            generate_for(Dialect::CiscoIos.spec(), "Gi1/0/1", &trunk(&[10, 20], Some(5))).unwrap();
        assert_eq!(
            plan.lines,
            vec![
                "interface GigabitEthernet1/0/1",
                "description uplink",
                "no switchport access vlan",
                "switchport mode trunk",
                "switchport trunk native vlan 5",
                "switchport trunk allowed vlan 10",
                "switchport trunk allowed vlan add 20",
            ]
        );
    }

    #[test]
    fn cisco_trunk_skips_out_of_range_native_vlan() {
        for native in [0, 4096, 5000] {
            let plan =
                generate_for(Dialect::CiscoNxos.spec(), "Ethernet1/2", &trunk(&[10], Some(native)))
                    .unwrap();
            assert!(
                !plan.lines.iter().any(|l| l.contains("native")),
                "native {native} leaked: {:?}",
                plan.lines
            );
        }
    }

    #[test]
    fn cisco_access_clears_trunk_state_first() {
        let plan = generate_for(Dialect::CiscoNxos.spec(), "Ethernet1/3", &access(30)).unwrap();
        assert_eq!(
            plan.lines,
            vec![
                "interface Ethernet1/3",
                "description desk 12",
                "no switchport trunk native vlan",
                "no switchport trunk allowed vlan",
                "switchport mode access",
                "switchport access vlan 30",
            ]
        );
    }

    #[test]
    fn empty_description_is_cleared() {
        let mut request = access(30);
        request.description = Some("  ".into());
        let plan = generate_for(Dialect::CiscoIos.spec(), "Gi1/0/3", &request).unwrap();
        assert_eq!(plan.lines[1], "no description");
    }

    #[test]
    fn omitted_description_emits_no_description_line() {
        let mut request = access(30);
        request.description = None;
        for dialect in [Dialect::CiscoIos, Dialect::JunosPortMode] {
            let plan = generate_for(dialect.spec(), "ge-0/0/3", &request).unwrap();
            assert!(
                !plan.lines.iter().any(|l| l.contains("description")),
                "{dialect:?}: {:?}",
                plan.lines
            );
        }
    }

    // ── Validation ──

    #[test]
    fn trunk_without_vlans_is_rejected() {
        let err = generate_for(Dialect::CiscoNxos.spec(), "Ethernet1/1", &trunk(&[], Some(5)))
            .unwrap_err();
        assert_eq!(err, CommandGenError::MissingAllowedVlans);
    }

    #[test]
    fn access_without_vlan_is_rejected() {
        let request = InterfaceChangeRequest {
            mode: PortMode::Access,
            ..InterfaceChangeRequest::default()
        };
        for dialect in [Dialect::CiscoIos, Dialect::JunosPortMode] {
            let err = generate_for(dialect.spec(), "ge-0/0/1", &request).unwrap_err();
            assert_eq!(err, CommandGenError::MissingAccessVlan);
        }
    }

    #[test]
    fn invalid_allowed_vlan_is_rejected() {
        let err = generate_for(Dialect::JunosInterfaceMode.spec(), "xe-0/0/1", &trunk(&[10, 0], None))
            .unwrap_err();
        assert_eq!(err, CommandGenError::InvalidVlan { vlan: 0 });
    }

    #[test]
    fn blank_port_is_rejected() {
        let err = generate_for(Dialect::CiscoIos.spec(), "   ", &access(10)).unwrap_err();
        assert_eq!(err, CommandGenError::EmptyPort);
    }

    // ── Junos ──

    #[test]
    fn junos_access_on_non_ex_model_has_no_native_vlan() {
        let mut request = access(30);
        request.native_vlan = Some(0);
        let plan = generate_for(Dialect::JunosInterfaceMode.spec(), "ge-0/0/7", &request).unwrap();
        assert!(!plan.lines.iter().any(|l| l.contains("native-vlan-id")));
        assert_eq!(
            plan.lines,
            vec![
                "delete interfaces ge-0/0/7",
                "set interfaces ge-0/0/7 description \"desk 12\"",
                "set interfaces ge-0/0/7 unit 0 family ethernet-switching interface-mode access",
                "set interfaces ge-0/0/7 unit 0 family ethernet-switching vlan members 30",
            ]
        );
        assert!(plan.requires_commit);
    }

    #[test]
    fn junos_ex_trunk_uses_port_mode_and_unit_native_vlan() {
        let plan =
            generate_for(Dialect::JunosPortMode.spec(), "ge-0/0/1", &trunk(&[10, 20], Some(5)))
                .unwrap();
        assert_eq!(
            plan.lines,
            vec![
                "delete interfaces ge-0/0/1",
                "set interfaces ge-0/0/1 description \"uplink\"",
                "set interfaces ge-0/0/1 unit 0 family ethernet-switching port-mode trunk",
                "set interfaces ge-0/0/1 unit 0 family ethernet-switching vlan members 10",
                "set interfaces ge-0/0/1 unit 0 family ethernet-switching vlan members 20",
                "set interfaces ge-0/0/1 unit 0 family ethernet-switching native-vlan-id 5",
            ]
        );
    }

    #[test]
    fn junos_interface_mode_native_vlan_sits_on_the_interface() {
        let plan = generate_for(
            Dialect::JunosInterfaceMode.spec(),
            "xe-0/0/4",
            &trunk(&[7], Some(7)),
        )
        .unwrap();
        assert_eq!(
            plan.lines.last().map(String::as_str),
            Some("set interfaces xe-0/0/4 native-vlan-id 7")
        );
    }
}
