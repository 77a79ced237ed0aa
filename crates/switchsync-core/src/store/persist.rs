// ── JSON persistence ──
//
// The whole inventory lives in one JSON document. Saves go to a sibling
// temp file first and are renamed into place, so a crash mid-write never
// leaves a truncated inventory behind. Each save gets its own temp name so
// concurrent savers (two CLI processes, or two threads) never share one.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::Stored;
use super::collection::EntityCollection;
use super::inventory::InventoryStore;
use super::reconcile::child_key;
use crate::error::CoreError;
use crate::model::{
    ArpEntry, Device, Group, InterfaceRecord, IpInterfaceEntry, MacTableEntry, NaturalKey,
};

const FORMAT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct InventoryFile {
    version: u32,
    next_id: u64,
    #[serde(default)]
    devices: Vec<Device>,
    #[serde(default)]
    groups: Vec<Group>,
    #[serde(default)]
    interfaces: Vec<Stored<InterfaceRecord>>,
    #[serde(default)]
    mac_table: Vec<Stored<MacTableEntry>>,
    #[serde(default)]
    arp_table: Vec<Stored<ArpEntry>>,
    #[serde(default)]
    ip_interfaces: Vec<Stored<IpInterfaceEntry>>,
}

fn persistence(path: &Path, action: &str, err: impl std::fmt::Display) -> CoreError {
    CoreError::Persistence {
        message: format!("cannot {action} {}: {err}", path.display()),
    }
}

fn owned<T: Clone>(rows: &Arc<Vec<Arc<T>>>) -> Vec<T> {
    rows.iter().map(|row| T::clone(row)).collect()
}

fn restore<T>(collection: &EntityCollection<Stored<T>>, rows: Vec<Stored<T>>)
where
    T: NaturalKey + Send + Sync + 'static,
{
    collection.upsert_many(rows.into_iter().map(|row| {
        let key = child_key(row.device_id, &row.data.natural_key());
        (key, row.id, row)
    }));
}

impl InventoryStore {
    /// Load an inventory file. A missing file yields an empty store.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no inventory file yet, starting empty");
                return Ok(Self::new());
            }
            Err(e) => return Err(persistence(path, "read", e)),
        };

        let file: InventoryFile =
            serde_json::from_str(&text).map_err(|e| persistence(path, "parse", e))?;
        if file.version > FORMAT_VERSION {
            return Err(persistence(
                path,
                "load",
                format!("format version {} is newer than supported {FORMAT_VERSION}", file.version),
            ));
        }

        let store = Self::new();
        let max_id = file
            .devices
            .iter()
            .map(|d| d.id)
            .chain(file.groups.iter().map(|g| g.id))
            .chain(file.interfaces.iter().map(|r| r.id))
            .chain(file.mac_table.iter().map(|r| r.id))
            .chain(file.arp_table.iter().map(|r| r.id))
            .chain(file.ip_interfaces.iter().map(|r| r.id))
            .map(|id| id.get())
            .max()
            .unwrap_or(0);
        store
            .next_id
            .store(file.next_id.max(max_id + 1), Ordering::Relaxed);

        store.devices.upsert_many(
            file.devices
                .into_iter()
                .map(|d| (d.hostname.clone(), d.id, d)),
        );
        store
            .groups
            .upsert_many(file.groups.into_iter().map(|g| (g.name.clone(), g.id, g)));
        restore(&store.interfaces, file.interfaces);
        restore(&store.mac_table, file.mac_table);
        restore(&store.arp_table, file.arp_table);
        restore(&store.ip_interfaces, file.ip_interfaces);

        debug!(path = %path.display(), devices = store.device_count(), "inventory loaded");
        Ok(store)
    }

    /// Write the inventory to `path` atomically.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let file = InventoryFile {
            version: FORMAT_VERSION,
            next_id: self.next_id.load(Ordering::Relaxed),
            devices: owned(&self.devices.snapshot()),
            groups: owned(&self.groups.snapshot()),
            interfaces: owned(&self.interfaces.snapshot()),
            mac_table: owned(&self.mac_table.snapshot()),
            arp_table: owned(&self.arp_table.snapshot()),
            ip_interfaces: owned(&self.ip_interfaces.snapshot()),
        };
        let json =
            serde_json::to_string_pretty(&file).map_err(|e| persistence(path, "serialize", e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| persistence(parent, "create", e))?;
        }
        let tmp = temp_path(path);
        let written = std::fs::write(&tmp, json)
            .map_err(|e| persistence(&tmp, "write", e))
            .and_then(|()| std::fs::rename(&tmp, path).map_err(|e| persistence(path, "replace", e)));
        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written?;

        debug!(path = %path.display(), "inventory saved");
        Ok(())
    }
}

static SAVE_SEQ: AtomicU64 = AtomicU64::new(0);

/// `.<name>.<pid>.<seq>.tmp` next to `path`, unique per save.
fn temp_path(path: &Path) -> PathBuf {
    let seq = SAVE_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = std::ffi::OsString::from(".");
    name.push(path.file_name().unwrap_or_default());
    name.push(format!(".{}.{seq}.tmp", std::process::id()));
    path.with_file_name(name)
}
