// ── Canonical domain model ──
//
// Every type in this module is the canonical, vendor-neutral shape of an
// inventory entity. Parsers and getters produce these; the store keeps them.

pub mod device;
pub mod entity_id;
pub mod interface;
pub mod tables;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use switchsync_core::model::*` gives you everything.

pub use device::{Device, Group, Platform};
pub use entity_id::{EntityId, MacAddress};
pub use interface::{InterfaceRecord, LinkStatus, PortMode};
pub use tables::{ArpEntry, IpInterfaceEntry, MacTableEntry, NaturalKey};
