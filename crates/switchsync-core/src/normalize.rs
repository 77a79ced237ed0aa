// ── Fact normalization ──
//
// Bridges raw device output (NAPALM-style getters plus CLI text) into the
// canonical inventory shapes. Getter payloads are deserialized into private
// wire structs first, then mapped; a getter that is missing or has the
// wrong shape fails the whole device with a `NormalizeError`.

use std::collections::{BTreeMap, HashMap};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::dialect::{Dialect, DialectSpec, INTERFACES_GETTER};
use crate::error::NormalizeError;
use crate::model::{
    ArpEntry, Device, InterfaceRecord, IpInterfaceEntry, LinkStatus, MacAddress, MacTableEntry,
};
use crate::parse::{ParseError, PartialInterfaceRecord, parse_running_config, parse_status_table};
use crate::session::RawFacts;

pub const FACTS_GETTER: &str = "get_facts";
pub const MAC_TABLE_GETTER: &str = "get_mac_address_table";
pub const ARP_TABLE_GETTER: &str = "get_arp_table";
pub const INTERFACES_IP_GETTER: &str = "get_interfaces_ip";

// ── Output types ───────────────────────────────────────────────────

/// Device-level facts from `get_facts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFacts {
    pub hostname: String,
    pub vendor: String,
    pub model: String,
    pub os_version: String,
    pub serial_number: String,
}

/// Everything one sync learned about a device, in canonical form.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CanonicalFactSet {
    pub device: DeviceFacts,
    pub interfaces: Vec<InterfaceRecord>,
    pub macs: Vec<MacTableEntry>,
    pub arps: Vec<ArpEntry>,
    pub ip_interfaces: Vec<IpInterfaceEntry>,
    /// Status rows and stanza lines that were skipped.
    pub parse_errors: Vec<ParseError>,
}

// ── Getter wire shapes ─────────────────────────────────────────────

#[derive(Deserialize)]
struct RawMacEntry {
    mac: String,
    interface: String,
    #[serde(default)]
    vlan: i64,
    #[serde(default, rename = "static")]
    is_static: bool,
    #[serde(default)]
    active: bool,
    #[serde(default)]
    moves: i64,
    #[serde(default)]
    last_move: f64,
}

#[derive(Deserialize)]
struct RawArpEntry {
    interface: String,
    mac: String,
    ip: String,
    #[serde(default, deserialize_with = "lenient_age")]
    age: f64,
}

#[derive(Deserialize)]
struct RawIpInterface {
    #[serde(default)]
    ipv4: BTreeMap<String, RawPrefix>,
}

#[derive(Deserialize)]
struct RawPrefix {
    prefix_length: u8,
}

#[derive(Deserialize)]
struct RawInterface {
    is_up: bool,
}

/// ARP ages arrive as numbers, numeric strings, empty strings or null.
/// Anything unusable (including NAPALM's `-1.0`) becomes 0.
fn lenient_age<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let age = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(age.filter(|a| a.is_finite() && *a >= 0.0).unwrap_or(0.0))
}

fn getter<T: DeserializeOwned>(raw: &RawFacts, name: &str) -> Result<T, NormalizeError> {
    let value = raw
        .getters
        .get(name)
        .ok_or_else(|| NormalizeError::new(name, "getter missing from response"))?;
    T::deserialize(value).map_err(|e| NormalizeError::new(name, e.to_string()))
}

// ── Entry point ────────────────────────────────────────────────────

/// Normalize one device's raw output.
///
/// `status_text` is the interface-status listing (absent for dialects that
/// take status from the `get_interfaces` getter); `running_config_text` is
/// the interface section of the running configuration.
pub fn normalize(
    device: &Device,
    raw: &RawFacts,
    status_text: Option<&str>,
    running_config_text: &str,
) -> Result<CanonicalFactSet, NormalizeError> {
    let facts: DeviceFacts = getter(raw, FACTS_GETTER)?;

    // The live model beats whatever the inventory was told.
    let model = Some(facts.model.as_str())
        .filter(|m| !m.is_empty())
        .or(device.model.as_deref());
    let spec = Dialect::resolve(device.platform, model).spec();

    let getter_status = if spec.status_from_getter {
        let interfaces: BTreeMap<String, RawInterface> = getter(raw, INTERFACES_GETTER)?;
        Some(
            interfaces
                .into_iter()
                .map(|(name, iface)| (spec.normalize_port(&name), iface.is_up))
                .collect::<HashMap<_, _>>(),
        )
    } else {
        None
    };

    let mut parse_errors = Vec::new();
    let status_records = match status_text {
        Some(text) => {
            let lines: Vec<&str> = text.lines().collect();
            let report = parse_status_table(&lines, spec);
            parse_errors.extend(report.errors);
            report.records
        }
        None => Vec::new(),
    };
    let config_report = parse_running_config(running_config_text, spec);
    parse_errors.extend(config_report.errors);

    let mut interfaces = merge_interfaces(status_records, config_report.records);
    if let Some(getter_status) = getter_status {
        apply_getter_status(&mut interfaces, &getter_status);
    }

    Ok(CanonicalFactSet {
        device: facts,
        interfaces,
        macs: mac_table(raw, spec)?,
        arps: arp_table(raw, spec)?,
        ip_interfaces: ip_interfaces(raw, spec)?,
        parse_errors,
    })
}

// ── Interfaces ─────────────────────────────────────────────────────

/// Join both sources by port. Status-table ports keep their table order,
/// config-only ports follow. The config source is applied second, so its
/// description, mode and VLANs win whenever it has them.
fn merge_interfaces(
    status: Vec<PartialInterfaceRecord>,
    config: Vec<PartialInterfaceRecord>,
) -> Vec<InterfaceRecord> {
    let mut merged: Vec<InterfaceRecord> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for partial in status.into_iter().chain(config) {
        let slot = *index.entry(partial.port.clone()).or_insert_with(|| {
            merged.push(InterfaceRecord::with_defaults(partial.port.clone()));
            merged.len() - 1
        });
        overlay(&mut merged[slot], partial);
    }

    merged
}

fn overlay(record: &mut InterfaceRecord, partial: PartialInterfaceRecord) {
    fn set(field: &mut String, value: Option<String>) {
        if let Some(value) = value {
            *field = value;
        }
    }

    set(&mut record.description, partial.description);
    if let Some(status) = partial.status {
        record.status = status;
    }
    set(&mut record.status_raw, partial.status_raw);
    if let Some(mode) = partial.mode {
        record.mode = mode;
    }
    set(&mut record.vlan, partial.vlan);
    set(&mut record.native_vlan, partial.native_vlan);
    set(&mut record.allowed_vlan, partial.allowed_vlan);
    set(&mut record.duplex, partial.duplex);
    set(&mut record.speed, partial.speed);
    set(&mut record.transceiver, partial.transceiver);
}

fn apply_getter_status(interfaces: &mut [InterfaceRecord], is_up: &HashMap<String, bool>) {
    for record in interfaces {
        let Some(&up) = is_up.get(&record.port) else {
            continue;
        };
        record.status = if up { LinkStatus::Up } else { LinkStatus::Down };
        if record.status_raw.is_empty() {
            record.status_raw = record.status.to_string();
        }
    }
}

// ── Forwarding tables ──────────────────────────────────────────────

fn mac_table(raw: &RawFacts, spec: &DialectSpec) -> Result<Vec<MacTableEntry>, NormalizeError> {
    let rows: Vec<RawMacEntry> = getter(raw, MAC_TABLE_GETTER)?;
    Ok(rows
        .into_iter()
        .map(|row| MacTableEntry {
            mac: MacAddress::canonical(&row.mac),
            interface: spec.normalize_port(&row.interface),
            vlan: row.vlan,
            is_static: row.is_static,
            active: row.active,
            moves: row.moves,
            last_move: row.last_move,
        })
        .collect())
}

fn arp_table(raw: &RawFacts, spec: &DialectSpec) -> Result<Vec<ArpEntry>, NormalizeError> {
    let rows: Vec<RawArpEntry> = getter(raw, ARP_TABLE_GETTER)?;
    Ok(rows
        .into_iter()
        .map(|row| ArpEntry {
            ip: row.ip.trim().to_owned(),
            interface: spec.normalize_port(&row.interface),
            mac: MacAddress::canonical(&row.mac),
            age: row.age,
        })
        .collect())
}

/// One entry per logical interface with its IPv4 addresses joined.
/// IPv6 addresses are dropped.
fn ip_interfaces(
    raw: &RawFacts,
    spec: &DialectSpec,
) -> Result<Vec<IpInterfaceEntry>, NormalizeError> {
    let table: BTreeMap<String, RawIpInterface> = getter(raw, INTERFACES_IP_GETTER)?;
    Ok(table
        .into_iter()
        .map(|(name, iface)| IpInterfaceEntry {
            interface: spec.normalize_port(&name),
            ipv4: iface
                .ipv4
                .iter()
                .map(|(addr, prefix)| format!("{addr}/{}", prefix.prefix_length))
                .collect::<Vec<_>>()
                .join(","),
        })
        .collect())
}
