// ── Forwarding / addressing table rows ──
//
// MAC table, ARP table, and per-interface IPv4 rows, plus the natural-key
// contract the store uses to upsert every child entity the same way.

use serde::{Deserialize, Serialize};

use super::entity_id::MacAddress;
use super::interface::InterfaceRecord;

/// Business key of a child entity, unique within one device.
pub trait NaturalKey {
    fn natural_key(&self) -> String;
}

/// One row of a device's MAC address table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacTableEntry {
    pub mac: MacAddress,
    pub interface: String,
    pub vlan: i64,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub active: bool,
    pub moves: i64,
    pub last_move: f64,
}

/// One row of a device's ARP table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArpEntry {
    pub ip: String,
    pub interface: String,
    pub mac: MacAddress,
    /// Seconds since the entry was learned; 0 when the device did not say.
    pub age: f64,
}

/// IPv4 addressing of one logical interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpInterfaceEntry {
    pub interface: String,
    /// Comma-joined `address/prefix` list; empty for IPv6-only interfaces.
    pub ipv4: String,
}

impl NaturalKey for InterfaceRecord {
    fn natural_key(&self) -> String {
        self.port.clone()
    }
}

impl NaturalKey for MacTableEntry {
    fn natural_key(&self) -> String {
        format!("{}|{}", self.mac, self.interface)
    }
}

impl NaturalKey for ArpEntry {
    fn natural_key(&self) -> String {
        format!("{}|{}|{}", self.ip, self.interface, self.mac)
    }
}

impl NaturalKey for IpInterfaceEntry {
    fn natural_key(&self) -> String {
        format!("{}|{}", self.interface, self.ipv4)
    }
}
