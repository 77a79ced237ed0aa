// ── Switch interface types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Operational status of an interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display)]
pub enum LinkStatus {
    #[serde(rename = "up")]
    #[strum(serialize = "up")]
    Up,
    #[serde(rename = "down")]
    #[strum(serialize = "down")]
    Down,
    /// No source reported a status for this port.
    #[default]
    #[serde(rename = "n/a")]
    #[strum(serialize = "n/a")]
    NotApplicable,
}

impl LinkStatus {
    pub fn is_up(self) -> bool {
        matches!(self, Self::Up)
    }
}

/// Switchport mode.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PortMode {
    #[default]
    Access,
    Trunk,
}

/// One switch interface, merged from the status table and running config.
///
/// VLAN fields are kept as strings: Junos VLAN members may be names, and
/// `allowed_vlan` is an ordered comma-joined list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceRecord {
    /// Canonical long-form port name (`Ethernet1/1`, `GigabitEthernet1/0/1`).
    pub port: String,
    pub description: String,
    pub status: LinkStatus,
    /// Status keyword as printed by the device (`connected`, `err-disabled`).
    #[serde(default)]
    pub status_raw: String,
    pub mode: PortMode,
    /// Access VLAN.
    pub vlan: String,
    pub native_vlan: String,
    pub allowed_vlan: String,
    pub duplex: String,
    pub speed: String,
    /// Transceiver / media type.
    pub transceiver: String,
}

impl InterfaceRecord {
    /// A record with every field at its default, for a port only one
    /// source reported.
    pub fn with_defaults(port: impl Into<String>) -> Self {
        Self {
            port: port.into(),
            description: String::new(),
            status: LinkStatus::NotApplicable,
            status_raw: String::new(),
            mode: PortMode::Access,
            vlan: "1".into(),
            native_vlan: "1".into(),
            allowed_vlan: "1".into(),
            duplex: "n/a".into(),
            speed: "n/a".into(),
            transceiver: "n/a".into(),
        }
    }
}
