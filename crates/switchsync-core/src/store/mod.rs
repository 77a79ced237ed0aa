// ── Inventory store ──
//
// In-memory inventory with natural-key upserts and JSON persistence.
// Devices are keyed by hostname, groups by name, child rows by
// `<device id>/<natural key>`.

mod collection;
mod inventory;
mod persist;
mod reconcile;
mod snapshot;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::EntityId;

pub use inventory::InventoryStore;
pub use reconcile::ReconcileSummary;
pub use snapshot::{InventorySnapshot, SnapshotEntry};

/// A child row (interface, MAC, ARP, IP interface) as persisted: the
/// canonical record plus its surrogate id, owning device and timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stored<T> {
    pub id: EntityId,
    pub device_id: EntityId,
    #[serde(flatten)]
    pub data: T,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<T> std::ops::Deref for Stored<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}
