// ── Running-config interface stanzas ──
//
// Cisco: `interface <name>` header, body indented by the dialect's width.
// Junos: braced hierarchy, one top-level block per interface, with
// `port-mode` or `interface-mode` vocabulary depending on model family.

use crate::dialect::{DialectSpec, StanzaShape, Vocabulary};
use crate::model::PortMode;

use super::{ParseReport, PartialInterfaceRecord};

/// Extract one partial record per interface stanza.
pub fn parse_running_config(text: &str, spec: &DialectSpec) -> ParseReport {
    match (spec.stanza, spec.vocabulary) {
        (StanzaShape::Indented { indent }, _) => parse_indented(text, indent, spec),
        (StanzaShape::Braced, Vocabulary::Junos { mode_keyword, .. }) => {
            parse_braced(text, mode_keyword, spec)
        }
        (StanzaShape::Braced, Vocabulary::Switchport) => parse_braced(text, "port-mode", spec),
    }
}

fn parse_mode(raw: &str) -> Option<PortMode> {
    match raw {
        "access" => Some(PortMode::Access),
        "trunk" => Some(PortMode::Trunk),
        _ => None,
    }
}

// ── Cisco ────────────────────────────────────────────────────────────

fn parse_indented(text: &str, indent: usize, spec: &DialectSpec) -> ParseReport {
    let mut report = ParseReport::default();
    let mut current: Option<PartialInterfaceRecord> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end();

        if let Some(name) = line.strip_prefix("interface ") {
            report.records.extend(current.take());
            current = Some(PartialInterfaceRecord::new(spec.normalize_port(name)));
            continue;
        }

        if current.is_none() {
            continue;
        }

        let depth = line.len() - line.trim_start_matches(' ').len();
        if line.is_empty() || depth < indent {
            // Blank line, `!`, or the next top-level statement ends the stanza.
            report.records.extend(current.take());
            continue;
        }
        if depth > indent {
            continue;
        }

        if let Some(record) = current.as_mut() {
            if let Err(reason) = apply_switchport(record, line.trim_start()) {
                report.error(idx + 1, line, reason);
            }
        }
    }

    report.records.extend(current);
    report
}

fn apply_switchport(record: &mut PartialInterfaceRecord, body: &str) -> Result<(), String> {
    if let Some(text) = body.strip_prefix("description ") {
        record.description = Some(text.trim().to_owned());
    } else if let Some(mode) = body.strip_prefix("switchport mode ") {
        let mode = mode.trim();
        record.mode =
            Some(parse_mode(mode).ok_or_else(|| format!("unsupported switchport mode `{mode}`"))?);
    } else if let Some(vlan) = body.strip_prefix("switchport access vlan ") {
        record.vlan = Some(vlan.trim().to_owned());
    } else if let Some(vlan) = body.strip_prefix("switchport trunk native vlan ") {
        record.native_vlan = Some(vlan.trim().to_owned());
    } else if let Some(more) = body.strip_prefix("switchport trunk allowed vlan add ") {
        let joined = match record.allowed_vlan.take() {
            Some(existing) if !existing.is_empty() => format!("{existing},{}", more.trim()),
            _ => more.trim().to_owned(),
        };
        record.allowed_vlan = Some(joined);
    } else if let Some(list) = body.strip_prefix("switchport trunk allowed vlan ") {
        record.allowed_vlan = Some(list.trim().to_owned());
    }
    Ok(())
}

// ── Junos ────────────────────────────────────────────────────────────

#[derive(Default)]
struct JunosStanza {
    record: PartialInterfaceRecord,
    members: Vec<String>,
}

impl JunosStanza {
    fn finish(self) -> PartialInterfaceRecord {
        let Self {
            mut record,
            members,
        } = self;
        if members.is_empty() {
            return record;
        }
        match record.mode {
            Some(PortMode::Trunk) => record.allowed_vlan = Some(members.join(",")),
            Some(PortMode::Access) | None => {
                record.mode = Some(PortMode::Access);
                record.vlan = members.into_iter().next();
            }
        }
        record
    }
}

fn parse_braced(text: &str, mode_keyword: &str, spec: &DialectSpec) -> ParseReport {
    let mut report = ParseReport::default();
    let mut current: Option<JunosStanza> = None;
    let mut depth = 0usize;
    let mut base = 0usize;

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("/*") {
            continue;
        }

        if let Some(header) = line.strip_suffix('{') {
            let name = header.trim();
            let name = name.strip_prefix("inactive: ").unwrap_or(name);
            if depth == 0 && name == "interfaces" {
                base = 1;
            } else if depth == base {
                current = Some(JunosStanza {
                    record: PartialInterfaceRecord::new(spec.normalize_port(name)),
                    members: Vec::new(),
                });
            }
            depth += 1;
            continue;
        }

        if line.starts_with('}') {
            depth = depth.saturating_sub(1);
            if depth == base {
                report.records.extend(current.take().map(JunosStanza::finish));
            }
            continue;
        }

        let Some(stanza) = current.as_mut() else {
            continue;
        };
        let statement = line.trim_end_matches(';').trim();
        if let Err(reason) = apply_junos(stanza, statement, mode_keyword) {
            report.error(idx + 1, line, reason);
        }
    }

    report.records.extend(current.map(JunosStanza::finish));
    report
}

fn apply_junos(stanza: &mut JunosStanza, statement: &str, mode_keyword: &str) -> Result<(), String> {
    let (keyword, value) = statement.split_once(' ').unwrap_or((statement, ""));
    let value = value.trim();

    match keyword {
        "description" => {
            stanza.record.description = Some(value.trim_matches('"').to_owned());
        }
        "members" => {
            let list = value.trim_start_matches('[').trim_end_matches(']');
            stanza
                .members
                .extend(list.split_whitespace().map(str::to_owned));
        }
        "native-vlan-id" => stanza.record.native_vlan = Some(value.to_owned()),
        kw if kw == mode_keyword => {
            stanza.record.mode = Some(
                parse_mode(value).ok_or_else(|| format!("unsupported {mode_keyword} `{value}`"))?,
            );
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dialect::Dialect;
    use pretty_assertions::assert_eq;

    const NXOS_RUNNING: &str = "\
!Command: show running-config interface
!Time: Mon Oct  5 10:00:00 2026

version 10.2(3) Bios:version 05.45

interface Ethernet1/1
  description srv-web
  switchport mode trunk
  switchport trunk native vlan 5
  switchport trunk allowed vlan 10,20
  no shutdown

interface Ethernet1/2
  description uplink to core
  switchport mode trunk
  switchport trunk allowed vlan 100-110
  switchport trunk allowed vlan add 200
  switchport trunk allowed vlan add 300

interface Ethernet1/3
  switchport access vlan 30

interface mgmt0
  vrf member management
  ip address 10.0.0.5/24
";

    #[test]
    fn nxos_stanzas() {
        let report = parse_running_config(NXOS_RUNNING, Dialect::CiscoNxos.spec());
        assert!(report.errors.is_empty());
        assert_eq!(report.records.len(), 4);

        let eth1 = &report.records[0];
        assert_eq!(eth1.port, "Ethernet1/1");
        assert_eq!(eth1.description.as_deref(), Some("srv-web"));
        assert_eq!(eth1.mode, Some(PortMode::Trunk));
        assert_eq!(eth1.native_vlan.as_deref(), Some("5"));
        assert_eq!(eth1.allowed_vlan.as_deref(), Some("10,20"));

        let eth2 = &report.records[1];
        assert_eq!(eth2.description.as_deref(), Some("uplink to core"));
        assert_eq!(eth2.allowed_vlan.as_deref(), Some("100-110,200,300"));

        let eth3 = &report.records[2];
        assert_eq!(eth3.mode, None);
        assert_eq!(eth3.vlan.as_deref(), Some("30"));

        let mgmt = &report.records[3];
        assert_eq!(mgmt, &PartialInterfaceRecord::new("mgmt0".into()));
    }

    #[test]
    fn ios_single_space_indent_and_bang_separators() {
        let text = "\
interface GigabitEthernet1/0/1
 description access point 3
 switchport access vlan 20
 switchport mode access
!
interface Gi1/0/2
 switchport mode dynamic desirable
!
hostname sw1
";
        let report = parse_running_config(text, Dialect::CiscoIos.spec());
        assert_eq!(report.records.len(), 2);
        let gi1 = &report.records[0];
        assert_eq!(gi1.description.as_deref(), Some("access point 3"));
        assert_eq!(gi1.mode, Some(PortMode::Access));
        assert_eq!(gi1.vlan.as_deref(), Some("20"));

        assert_eq!(report.records[1].port, "GigabitEthernet1/0/2");
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].line, 7);
    }

    #[test]
    fn nxos_body_at_ios_indent_is_ignored() {
        // One-space body lines are not part of a two-space NX-OS stanza.
        let text = "interface Ethernet1/1\n description wrong shape\n";
        let report = parse_running_config(text, Dialect::CiscoNxos.spec());
        assert_eq!(report.records.len(), 1);
        assert_eq!(report.records[0].description, None);
    }

    const JUNOS_EX: &str = r#"
## Last commit: 2026-10-01 09:00:00 UTC by netops
ge-0/0/1 {
    description "web server";
    unit 0 {
        family ethernet-switching {
            port-mode trunk;
            vlan {
                members [ 10 20 ];
            }
            native-vlan-id 5;
        }
    }
}
ge-0/0/2 {
    unit 0 {
        family ethernet-switching {
            vlan {
                members users;
            }
        }
    }
}
"#;

    #[test]
    fn junos_port_mode_stanzas() {
        let report = parse_running_config(JUNOS_EX, Dialect::JunosPortMode.spec());
        assert!(report.errors.is_empty());
        assert_eq!(report.records.len(), 2);

        let ge1 = &report.records[0];
        assert_eq!(ge1.port, "ge-0/0/1");
        assert_eq!(ge1.description.as_deref(), Some("web server"));
        assert_eq!(ge1.mode, Some(PortMode::Trunk));
        assert_eq!(ge1.allowed_vlan.as_deref(), Some("10,20"));
        assert_eq!(ge1.native_vlan.as_deref(), Some("5"));

        let ge2 = &report.records[1];
        assert_eq!(ge2.mode, Some(PortMode::Access));
        assert_eq!(ge2.vlan.as_deref(), Some("users"));
    }

    #[test]
    fn junos_interface_mode_with_wrapper_block() {
        let text = r"
interfaces {
    xe-0/0/4 {
        native-vlan-id 7;
        unit 0 {
            family ethernet-switching {
                interface-mode trunk;
                vlan {
                    members [ 7 8 9 ];
                }
            }
        }
    }
}
";
        let report = parse_running_config(text, Dialect::JunosInterfaceMode.spec());
        assert_eq!(report.records.len(), 1);
        let xe = &report.records[0];
        assert_eq!(xe.port, "xe-0/0/4");
        assert_eq!(xe.mode, Some(PortMode::Trunk));
        assert_eq!(xe.native_vlan.as_deref(), Some("7"));
        assert_eq!(xe.allowed_vlan.as_deref(), Some("7,8,9"));
    }

    #[test]
    fn junos_ignores_other_family_vocabulary() {
        // `port-mode` means nothing to an interface-mode dialect.
        let report = parse_running_config(JUNOS_EX, Dialect::JunosInterfaceMode.spec());
        let ge1 = &report.records[0];
        assert_eq!(ge1.mode, Some(PortMode::Access));
        assert_eq!(ge1.vlan.as_deref(), Some("10"));
    }
}
