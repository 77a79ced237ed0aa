// ── Inventory store ──
//
// Thread-safe storage for devices, groups and the four per-device child
// tables. Writes for different devices touch disjoint keys. Child-row
// writes hold the lifecycle lock shared and device removal holds it
// exclusively, so no row is ever stored for a device that is gone.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use tracing::debug;

use super::Stored;
use super::collection::EntityCollection;
use super::reconcile::{ReconcileSummary, child_key, reconcile};
use crate::model::{
    ArpEntry, Device, EntityId, Group, InterfaceRecord, IpInterfaceEntry, MacTableEntry,
    NaturalKey,
};

/// Central store for all inventory entities.
pub struct InventoryStore {
    pub(crate) next_id: AtomicU64,
    pub(crate) devices: EntityCollection<Device>,
    pub(crate) groups: EntityCollection<Group>,
    pub(crate) interfaces: EntityCollection<Stored<InterfaceRecord>>,
    pub(crate) mac_table: EntityCollection<Stored<MacTableEntry>>,
    pub(crate) arp_table: EntityCollection<Stored<ArpEntry>>,
    pub(crate) ip_interfaces: EntityCollection<Stored<IpInterfaceEntry>>,
    lifecycle: RwLock<()>,
}

impl InventoryStore {
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            devices: EntityCollection::new(),
            groups: EntityCollection::new(),
            interfaces: EntityCollection::new(),
            mac_table: EntityCollection::new(),
            arp_table: EntityCollection::new(),
            ip_interfaces: EntityCollection::new(),
            lifecycle: RwLock::new(()),
        }
    }

    /// Allocate a fresh surrogate id.
    pub fn next_id(&self) -> EntityId {
        EntityId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    // ── Devices ──────────────────────────────────────────────────────

    pub fn devices(&self) -> Arc<Vec<Arc<Device>>> {
        self.devices.snapshot()
    }

    pub fn device(&self, hostname: &str) -> Option<Arc<Device>> {
        self.devices.get_by_key(hostname)
    }

    pub fn device_by_id(&self, id: EntityId) -> Option<Arc<Device>> {
        self.devices.get_by_id(id)
    }

    /// Insert or replace a device by hostname. Returns `true` if new.
    pub fn upsert_device(&self, device: Device) -> bool {
        self.devices.upsert(device.hostname.clone(), device.id, device)
    }

    /// Apply `update` to a stored device and return the result. Returns
    /// `None` without writing if the device is not (or no longer) stored.
    ///
    /// `update` must not change the hostname.
    pub fn modify_device(
        &self,
        hostname: &str,
        update: impl FnOnce(&mut Device),
    ) -> Option<Device> {
        let _guard = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        let mut device = Device::clone(&*self.devices.get_by_key(hostname)?);
        update(&mut device);
        self.devices.upsert(device.hostname.clone(), device.id, device.clone());
        Some(device)
    }

    /// Remove a device and every child row it owns.
    pub fn remove_device(&self, hostname: &str) -> Option<Arc<Device>> {
        let _guard = self.lifecycle.write().unwrap_or_else(PoisonError::into_inner);
        let device = self.devices.remove(hostname)?;
        let id = device.id;
        let removed = self.interfaces.remove_where(|r| r.device_id == id)
            + self.mac_table.remove_where(|r| r.device_id == id)
            + self.arp_table.remove_where(|r| r.device_id == id)
            + self.ip_interfaces.remove_where(|r| r.device_id == id);
        debug!(device = %hostname, removed, "device removed with child rows");
        Some(device)
    }

    pub fn device_count(&self) -> usize {
        self.devices.len()
    }

    // ── Groups ───────────────────────────────────────────────────────

    pub fn groups(&self) -> Arc<Vec<Arc<Group>>> {
        self.groups.snapshot()
    }

    pub fn group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.get_by_key(name)
    }

    pub fn upsert_group(&self, group: Group) -> bool {
        self.groups.upsert(group.name.clone(), group.id, group)
    }

    pub fn remove_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.remove(name)
    }

    // ── Child rows ───────────────────────────────────────────────────
    //
    // Every writer returns `None`, storing nothing, once the owning device
    // has been removed.

    fn while_present<R>(&self, device_id: EntityId, write: impl FnOnce() -> R) -> Option<R> {
        let _guard = self.lifecycle.read().unwrap_or_else(PoisonError::into_inner);
        if self.devices.get_by_id(device_id).is_none() {
            debug!(%device_id, "device no longer stored, write dropped");
            return None;
        }
        Some(write())
    }

    pub fn reconcile_interfaces(
        &self,
        device_id: EntityId,
        items: Vec<InterfaceRecord>,
        now: DateTime<Utc>,
    ) -> Option<ReconcileSummary> {
        self.while_present(device_id, || {
            reconcile(&self.interfaces, device_id, items, now, || self.next_id())
        })
    }

    pub fn reconcile_macs(
        &self,
        device_id: EntityId,
        items: Vec<MacTableEntry>,
        now: DateTime<Utc>,
    ) -> Option<ReconcileSummary> {
        self.while_present(device_id, || {
            reconcile(&self.mac_table, device_id, items, now, || self.next_id())
        })
    }

    pub fn reconcile_arps(
        &self,
        device_id: EntityId,
        items: Vec<ArpEntry>,
        now: DateTime<Utc>,
    ) -> Option<ReconcileSummary> {
        self.while_present(device_id, || {
            reconcile(&self.arp_table, device_id, items, now, || self.next_id())
        })
    }

    pub fn reconcile_ip_interfaces(
        &self,
        device_id: EntityId,
        items: Vec<IpInterfaceEntry>,
        now: DateTime<Utc>,
    ) -> Option<ReconcileSummary> {
        self.while_present(device_id, || {
            reconcile(&self.ip_interfaces, device_id, items, now, || self.next_id())
        })
    }

    pub fn interface(&self, device_id: EntityId, port: &str) -> Option<Arc<Stored<InterfaceRecord>>> {
        self.interfaces.get_by_key(&child_key(device_id, port))
    }

    /// Write one interface record, keeping its id and creation time if it
    /// already exists.
    pub fn put_interface(
        &self,
        device_id: EntityId,
        record: InterfaceRecord,
        now: DateTime<Utc>,
    ) -> Option<Stored<InterfaceRecord>> {
        self.while_present(device_id, || {
            let key = child_key(device_id, &record.natural_key());
            let (id, created_at) = match self.interfaces.get_by_key(&key) {
                Some(existing) => (existing.id, existing.created_at),
                None => (self.next_id(), now),
            };
            let stored = Stored {
                id,
                device_id,
                data: record,
                created_at,
                updated_at: now,
            };
            self.interfaces.upsert(key, id, stored.clone());
            stored
        })
    }

    pub fn interfaces_for(&self, device_id: EntityId) -> Vec<Arc<Stored<InterfaceRecord>>> {
        rows_for(&self.interfaces, device_id)
    }

    pub fn macs_for(&self, device_id: EntityId) -> Vec<Arc<Stored<MacTableEntry>>> {
        rows_for(&self.mac_table, device_id)
    }

    pub fn arps_for(&self, device_id: EntityId) -> Vec<Arc<Stored<ArpEntry>>> {
        rows_for(&self.arp_table, device_id)
    }

    pub fn ip_interfaces_for(&self, device_id: EntityId) -> Vec<Arc<Stored<IpInterfaceEntry>>> {
        rows_for(&self.ip_interfaces, device_id)
    }
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn rows_for<T: Send + Sync + 'static>(
    collection: &EntityCollection<Stored<T>>,
    device_id: EntityId,
) -> Vec<Arc<Stored<T>>> {
    collection
        .snapshot()
        .iter()
        .filter(|r| r.device_id == device_id)
        .cloned()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::{LinkStatus, MacAddress, Platform, PortMode};
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    fn sample_device(store: &InventoryStore, hostname: &str) -> Device {
        let now = Utc::now();
        let device = Device {
            id: store.next_id(),
            hostname: hostname.into(),
            address: format!("{hostname}.mgmt"),
            port: None,
            platform: Platform::Nxos,
            model: None,
            credential: None,
            groups: Vec::new(),
            description: None,
            device_type: None,
            vendor: None,
            os_version: None,
            serial_number: None,
            last_synced: None,
            created_at: now,
            updated_at: now,
        };
        store.upsert_device(device.clone());
        device
    }

    fn iface(port: &str, description: &str) -> InterfaceRecord {
        InterfaceRecord {
            description: description.into(),
            status: LinkStatus::Up,
            status_raw: "connected".into(),
            mode: PortMode::Trunk,
            ..InterfaceRecord::with_defaults(port)
        }
    }

    fn mac(raw: &str, interface: &str) -> MacTableEntry {
        MacTableEntry {
            mac: MacAddress::canonical(raw),
            interface: interface.into(),
            vlan: 10,
            is_static: false,
            active: true,
            moves: 0,
            last_move: 0.0,
        }
    }

    #[test]
    fn reconciling_twice_is_idempotent() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let t0 = Utc::now();
        let items = vec![iface("Ethernet1/1", "a"), iface("Ethernet1/2", "b")];

        let first = store.reconcile_interfaces(dev.id, items.clone(), t0).unwrap();
        let before = store.interfaces_for(dev.id);
        let second = store
            .reconcile_interfaces(dev.id, items, t0 + Duration::seconds(60))
            .unwrap();
        let after = store.interfaces_for(dev.id);

        assert_eq!(first.inserted, 2);
        assert_eq!(second, ReconcileSummary { inserted: 0, updated: 0, unchanged: 2 });
        assert_eq!(before, after);
    }

    #[test]
    fn changed_fact_set_updates_only_changed_rows() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let t0 = Utc::now();
        let t1 = t0 + Duration::seconds(60);
        store.reconcile_interfaces(
            dev.id,
            vec![iface("Ethernet1/1", "a"), iface("Ethernet1/2", "b")],
            t0,
        );
        let original = store.interface(dev.id, "Ethernet1/1").unwrap();

        let summary = store
            .reconcile_interfaces(
                dev.id,
                vec![iface("Ethernet1/1", "a"), iface("Ethernet1/2", "renamed")],
                t1,
            )
            .unwrap();

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(store.interface(dev.id, "Ethernet1/1").unwrap(), original);

        let eth2 = store.interface(dev.id, "Ethernet1/2").unwrap();
        assert_eq!(eth2.description, "renamed");
        assert_eq!(eth2.mode, PortMode::Trunk);
        assert_eq!(eth2.created_at, t0);
        assert_eq!(eth2.updated_at, t1);
    }

    #[test]
    fn rows_missing_from_a_later_sync_are_kept() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let now = Utc::now();
        store.reconcile_macs(dev.id, vec![mac("aa:bb:cc:dd:ee:01", "Ethernet1/1")], now);
        store.reconcile_macs(dev.id, vec![mac("aa:bb:cc:dd:ee:02", "Ethernet1/1")], now);
        assert_eq!(store.macs_for(dev.id).len(), 2);
    }

    #[test]
    fn same_mac_in_two_formats_is_one_row() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let summary = store
            .reconcile_macs(
                dev.id,
                vec![mac("AA:BB:CC:DD:EE:FF", "Ethernet1/1"), mac("aabb.ccdd.eeff", "Ethernet1/1")],
                Utc::now(),
            )
            .unwrap();
        assert_eq!(summary.inserted, 1);
        assert_eq!(store.macs_for(dev.id).len(), 1);
    }

    #[test]
    fn removing_a_device_cascades_to_its_rows_only() {
        let store = InventoryStore::new();
        let sw1 = sample_device(&store, "sw1");
        let sw2 = sample_device(&store, "sw2");
        let now = Utc::now();
        for dev in [&sw1, &sw2] {
            store.reconcile_interfaces(dev.id, vec![iface("Ethernet1/1", "x")], now);
            store.reconcile_macs(dev.id, vec![mac("aa:bb:cc:dd:ee:ff", "Ethernet1/1")], now);
            store.reconcile_arps(
                dev.id,
                vec![ArpEntry {
                    ip: "10.0.0.9".into(),
                    interface: "Vlan10".into(),
                    mac: MacAddress::canonical("aa:bb:cc:dd:ee:ff"),
                    age: 0.0,
                }],
                now,
            );
            store.reconcile_ip_interfaces(
                dev.id,
                vec![IpInterfaceEntry {
                    interface: "Vlan10".into(),
                    ipv4: "10.0.0.1/24".into(),
                }],
                now,
            );
        }

        let removed = store.remove_device("sw1").unwrap();
        assert_eq!(removed.id, sw1.id);
        assert!(store.device("sw1").is_none());

        assert!(store.interfaces_for(sw1.id).is_empty());
        assert!(store.macs_for(sw1.id).is_empty());
        assert!(store.arps_for(sw1.id).is_empty());
        assert!(store.ip_interfaces_for(sw1.id).is_empty());

        assert_eq!(store.interfaces_for(sw2.id).len(), 1);
        assert_eq!(store.macs_for(sw2.id).len(), 1);
        assert_eq!(store.arps_for(sw2.id).len(), 1);
        assert_eq!(store.ip_interfaces_for(sw2.id).len(), 1);
    }

    #[test]
    fn put_interface_keeps_identity() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let t0 = Utc::now();
        let first = store.put_interface(dev.id, iface("Ethernet1/5", "old"), t0).unwrap();
        let second = store
            .put_interface(dev.id, iface("Ethernet1/5", "new"), t0 + Duration::seconds(1))
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.created_at, t0);
        assert_eq!(second.description, "new");
    }

    #[test]
    fn writes_for_a_removed_device_store_nothing() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let now = Utc::now();
        store.remove_device("sw1").unwrap();

        assert!(store.reconcile_interfaces(dev.id, vec![iface("Ethernet1/1", "a")], now).is_none());
        assert!(store.reconcile_macs(dev.id, vec![mac("aa:bb:cc:dd:ee:ff", "Ethernet1/1")], now).is_none());
        assert!(store.put_interface(dev.id, iface("Ethernet1/2", "b"), now).is_none());
        assert!(store.modify_device("sw1", |d| d.last_synced = Some(now)).is_none());

        assert!(store.interfaces_for(dev.id).is_empty());
        assert!(store.macs_for(dev.id).is_empty());
        assert!(store.device("sw1").is_none());
        assert_eq!(store.device_count(), 0);
    }

    #[test]
    fn modify_device_keeps_identity() {
        let store = InventoryStore::new();
        let dev = sample_device(&store, "sw1");
        let updated = store
            .modify_device("sw1", |d| d.vendor = Some("Cisco".into()))
            .unwrap();
        assert_eq!(updated.id, dev.id);
        assert_eq!(store.device("sw1").unwrap().vendor.as_deref(), Some("Cisco"));
        assert_eq!(store.device_by_id(dev.id).unwrap().hostname, "sw1");
    }

    #[test]
    fn removal_racing_with_reconcile_leaves_no_orphans() {
        for round in 0..50 {
            let store = InventoryStore::new();
            let dev = sample_device(&store, "sw1");
            let now = Utc::now();
            let items: Vec<_> = (1..=32)
                .map(|n| iface(&format!("Ethernet1/{n}"), "x"))
                .collect();

            std::thread::scope(|s| {
                s.spawn(|| store.reconcile_interfaces(dev.id, items, now));
                s.spawn(|| store.put_interface(dev.id, iface("Ethernet2/1", "y"), now));
                s.spawn(|| store.remove_device("sw1"));
            });

            assert!(store.device("sw1").is_none(), "round {round}");
            assert!(store.interfaces_for(dev.id).is_empty(), "round {round}");
        }
    }
}
