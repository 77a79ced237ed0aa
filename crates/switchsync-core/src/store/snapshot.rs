// ── Inventory snapshot ──
//
// Immutable view of what the session layer needs to reach each device.
// Rebuilt whenever a device or group changes and handed to the
// orchestrator at call time; never mutated in place.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{Device, Platform};
use crate::session::SessionTarget;

/// Connection facts for one device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotEntry {
    pub hostname: String,
    pub address: String,
    pub port: Option<u16>,
    pub platform: Platform,
    pub model: Option<String>,
    pub credential: Option<String>,
    pub groups: Vec<String>,
}

impl SnapshotEntry {
    /// Resolve the credential reference into a session target.
    pub fn target(&self, config: &EngineConfig) -> Result<SessionTarget, CoreError> {
        let credential = config
            .credential(self.credential.as_deref())
            .ok_or_else(|| CoreError::Config {
                message: match &self.credential {
                    Some(name) => format!("{}: credential `{name}` is not configured", self.hostname),
                    None => format!("{}: no credential and no default credential", self.hostname),
                },
            })?;
        Ok(SessionTarget {
            hostname: self.hostname.clone(),
            address: self.address.clone(),
            port: self.port,
            platform: self.platform,
            username: credential.username.clone(),
            password: credential.password.clone(),
        })
    }
}

/// All devices, keyed by hostname.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventorySnapshot {
    devices: BTreeMap<String, SnapshotEntry>,
}

impl InventorySnapshot {
    pub fn from_devices(devices: &[Arc<Device>]) -> Self {
        let devices = devices
            .iter()
            .map(|d| {
                let entry = SnapshotEntry {
                    hostname: d.hostname.clone(),
                    address: d.address.clone(),
                    port: d.port,
                    platform: d.platform,
                    model: d.model.clone(),
                    credential: d.credential.clone(),
                    groups: d.groups.clone(),
                };
                (d.hostname.clone(), entry)
            })
            .collect();
        Self { devices }
    }

    pub fn get(&self, hostname: &str) -> Option<&SnapshotEntry> {
        self.devices.get(hostname)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SnapshotEntry> {
        self.devices.values()
    }

    /// Members of `group`, in hostname order.
    pub fn in_group<'a>(&'a self, group: &'a str) -> impl Iterator<Item = &'a SnapshotEntry> + 'a {
        self.devices
            .values()
            .filter(move |e| e.groups.iter().any(|g| g == group))
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}
