// ── Reconciliation engine ──
//
// Top-level coordinator. Owns the inventory store, the session
// orchestrator and the current inventory snapshot. A sync walks one
// device through Fetching -> Normalizing -> Upserting -> Done; a push
// walks Generating -> Pushing -> Committing -> Recording. Failures carry
// the stage they happened in.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use chrono::Utc;
use strum::Display;
use thiserror::Error;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::command::generate;
use crate::command::requests::{
    AddDeviceRequest, AddGroupRequest, GroupCommand, InterfaceChangeRequest, UpdateDeviceRequest,
};
use crate::config::EngineConfig;
use crate::dialect::Dialect;
use crate::error::{CoreError, SessionError};
use crate::model::{Device, EntityId, Group, InterfaceRecord, PortMode};
use crate::normalize::{DeviceFacts, normalize};
use crate::parse::ParseError;
use crate::session::{
    ConfigPush, FactRequest, Operation, Payload, SessionOrchestrator, Transport,
};
use crate::store::{InventorySnapshot, InventoryStore, ReconcileSummary, Stored};

// ── Stages and outcomes ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SyncStage {
    Fetching,
    Normalizing,
    Upserting,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum PushStage {
    Generating,
    Pushing,
    Committing,
    Recording,
}

/// A device sync that stopped at `stage`.
#[derive(Debug, Error)]
#[error("sync failed while {stage}: {source}")]
pub struct SyncError {
    pub stage: SyncStage,
    #[source]
    pub source: CoreError,
}

impl SyncError {
    fn new(stage: SyncStage, source: impl Into<CoreError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// An interface change that stopped at `stage`.
#[derive(Debug, Error)]
#[error("interface change failed while {stage}: {source}")]
pub struct PushError {
    pub stage: PushStage,
    #[source]
    pub source: CoreError,
}

impl PushError {
    fn new(stage: PushStage, source: impl Into<CoreError>) -> Self {
        Self {
            stage,
            source: source.into(),
        }
    }
}

/// What one successful sync changed.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncReport {
    /// The device record after metadata refresh.
    pub device: Device,
    pub interfaces: ReconcileSummary,
    pub macs: ReconcileSummary,
    pub arps: ReconcileSummary,
    pub ip_interfaces: ReconcileSummary,
    pub parse_errors: Vec<ParseError>,
}

pub type SyncResults = BTreeMap<String, Result<SyncReport, SyncError>>;
pub type GroupResults = BTreeMap<String, Result<String, CoreError>>;

// ── Engine ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<EngineInner>`.
#[derive(Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    config: EngineConfig,
    store: Arc<InventoryStore>,
    orchestrator: SessionOrchestrator,
    snapshot: ArcSwap<InventorySnapshot>,
}

impl Engine {
    pub fn new(config: EngineConfig, transport: Arc<dyn Transport>, store: Arc<InventoryStore>) -> Self {
        let orchestrator = SessionOrchestrator::from_config(transport, &config);
        let snapshot = ArcSwap::from_pointee(InventorySnapshot::from_devices(&store.devices()));
        Self {
            inner: Arc::new(EngineInner {
                config,
                store,
                orchestrator,
                snapshot,
            }),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    /// The snapshot the session layer currently works from.
    pub fn snapshot(&self) -> Arc<InventorySnapshot> {
        self.inner.snapshot.load_full()
    }

    fn refresh_snapshot(&self) {
        let snapshot = InventorySnapshot::from_devices(&self.inner.store.devices());
        debug!(devices = snapshot.len(), "inventory snapshot rebuilt");
        self.inner.snapshot.store(Arc::new(snapshot));
    }

    // ── Devices ──────────────────────────────────────────────────

    /// Look up a device by hostname, falling back to its numeric id.
    pub fn device(&self, identifier: &str) -> Result<Arc<Device>, CoreError> {
        let store = &self.inner.store;
        store
            .device(identifier)
            .or_else(|| {
                identifier
                    .parse::<EntityId>()
                    .ok()
                    .and_then(|id| store.device_by_id(id))
            })
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })
    }

    pub fn devices(&self) -> Arc<Vec<Arc<Device>>> {
        self.inner.store.devices()
    }

    pub fn add_device(&self, request: AddDeviceRequest) -> Result<Device, CoreError> {
        let hostname = request.hostname.trim();
        if hostname.is_empty() || request.address.trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "hostname and address are required".into(),
            });
        }
        if self.inner.store.device(hostname).is_some() {
            return Err(CoreError::Conflict {
                message: format!("device {hostname} already exists"),
            });
        }
        self.check_groups(&request.groups)?;

        let now = Utc::now();
        let device = Device {
            id: self.inner.store.next_id(),
            hostname: hostname.to_owned(),
            address: request.address.trim().to_owned(),
            port: request.port,
            platform: request.platform,
            model: request.model,
            credential: request.credential,
            groups: request.groups,
            description: request.description,
            device_type: request.device_type,
            vendor: None,
            os_version: None,
            serial_number: None,
            last_synced: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.store.upsert_device(device.clone());
        self.refresh_snapshot();
        info!(device = %device.hostname, id = %device.id, "device added");
        Ok(device)
    }

    pub fn update_device(
        &self,
        identifier: &str,
        request: UpdateDeviceRequest,
    ) -> Result<Device, CoreError> {
        let current = self.device(identifier)?;
        if let Some(groups) = &request.groups {
            self.check_groups(groups)?;
        }

        let device = self
            .inner
            .store
            .modify_device(&current.hostname, |device| {
                if let Some(address) = request.address {
                    device.address = address;
                }
                if let Some(port) = request.port {
                    device.port = Some(port);
                }
                if let Some(platform) = request.platform {
                    device.platform = platform;
                }
                if let Some(model) = request.model {
                    device.model = Some(model);
                }
                if let Some(credential) = request.credential {
                    device.credential = Some(credential);
                }
                if let Some(groups) = request.groups {
                    device.groups = groups;
                }
                if let Some(description) = request.description {
                    device.description = Some(description);
                }
                if let Some(device_type) = request.device_type {
                    device.device_type = Some(device_type);
                }
                device.updated_at = Utc::now();
            })
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;
        self.refresh_snapshot();
        debug!(device = %device.hostname, "device updated");
        Ok(device)
    }

    /// Remove a device together with all of its interface, MAC, ARP and
    /// IP-interface rows.
    pub fn remove_device(&self, identifier: &str) -> Result<Arc<Device>, CoreError> {
        let device = self.device(identifier)?;
        let removed = self
            .inner
            .store
            .remove_device(&device.hostname)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: identifier.to_owned(),
            })?;
        self.refresh_snapshot();
        info!(device = %removed.hostname, "device removed");
        Ok(removed)
    }

    fn check_groups(&self, groups: &[String]) -> Result<(), CoreError> {
        match groups.iter().find(|g| self.inner.store.group(g).is_none()) {
            Some(unknown) => Err(CoreError::ValidationFailed {
                message: format!("unknown group `{unknown}`"),
            }),
            None => Ok(()),
        }
    }

    // ── Groups ───────────────────────────────────────────────────

    pub fn groups(&self) -> Arc<Vec<Arc<Group>>> {
        self.inner.store.groups()
    }

    pub fn add_group(&self, request: AddGroupRequest) -> Result<Group, CoreError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "group name is required".into(),
            });
        }
        if self.inner.store.group(name).is_some() {
            return Err(CoreError::Conflict {
                message: format!("group {name} already exists"),
            });
        }
        let now = Utc::now();
        let group = Group {
            id: self.inner.store.next_id(),
            name: name.to_owned(),
            description: request.description,
            site: request.site,
            created_at: now,
            updated_at: now,
        };
        self.inner.store.upsert_group(group.clone());
        self.refresh_snapshot();
        Ok(group)
    }

    /// Remove a group and drop it from every member's group list.
    pub fn remove_group(&self, name: &str) -> Result<Arc<Group>, CoreError> {
        let store = &self.inner.store;
        let group = store.remove_group(name).ok_or_else(|| CoreError::GroupNotFound {
            name: name.to_owned(),
        })?;

        let now = Utc::now();
        for device in store.devices().iter().filter(|d| d.in_group(name)) {
            store.modify_device(&device.hostname, |device| {
                device.groups.retain(|g| g != name);
                device.updated_at = now;
            });
        }
        self.refresh_snapshot();
        Ok(group)
    }

    // ── Sync ─────────────────────────────────────────────────────

    /// Fetch, normalize and reconcile one device.
    pub async fn sync_device(&self, identifier: &str) -> Result<SyncReport, SyncError> {
        let device = self
            .device(identifier)
            .map_err(|e| SyncError::new(SyncStage::Fetching, e))?;
        let hostname = device.hostname.clone();
        self.sync_devices(vec![device])
            .await
            .remove(&hostname)
            .unwrap_or_else(|| {
                Err(SyncError::new(
                    SyncStage::Fetching,
                    CoreError::DeviceNotFound {
                        identifier: hostname,
                    },
                ))
            })
    }

    /// Sync every device concurrently. One outcome per hostname.
    pub async fn sync_all_devices(&self) -> SyncResults {
        let devices = self.inner.store.devices().iter().cloned().collect();
        self.sync_devices(devices).await
    }

    async fn sync_devices(&self, devices: Vec<Arc<Device>>) -> SyncResults {
        let snapshot = self.snapshot();
        let mut results = SyncResults::new();
        let mut work = Vec::with_capacity(devices.len());

        for device in &devices {
            let target = snapshot
                .get(&device.hostname)
                .ok_or_else(|| CoreError::DeviceNotFound {
                    identifier: device.hostname.clone(),
                })
                .and_then(|entry| entry.target(&self.inner.config));
            match target {
                Ok(target) => {
                    let spec = Dialect::resolve(device.platform, device.model.as_deref()).spec();
                    let request = FactRequest {
                        getters: spec.getters(),
                        commands: spec.commands(),
                    };
                    stage(&device.hostname, SyncStage::Fetching);
                    work.push((target, Operation::GetFacts(request)));
                }
                Err(e) => {
                    results.insert(device.hostname.clone(), Err(SyncError::new(SyncStage::Fetching, e)));
                }
            }
        }

        let mut fetched = self.inner.orchestrator.run_each(work).await;
        let mut refreshed = false;

        for device in devices {
            let Some(outcome) = fetched.remove(&device.hostname) else {
                continue;
            };
            let result = match outcome {
                Ok(payload) => self.apply_sync(&device, payload),
                Err(e) => Err(SyncError::new(SyncStage::Fetching, e)),
            };
            match &result {
                Ok(_) => refreshed = true,
                Err(e) => warn!(device = %device.hostname, stage = %e.stage, error = %e.source, "sync failed"),
            }
            results.insert(device.hostname.clone(), result);
        }

        // Metadata refresh may have changed models and with them dialects.
        if refreshed {
            self.refresh_snapshot();
        }
        results
    }

    fn apply_sync(&self, device: &Device, payload: Payload) -> Result<SyncReport, SyncError> {
        let Payload::Facts(raw) = payload else {
            return Err(SyncError::new(
                SyncStage::Fetching,
                SessionError::Command {
                    message: "device returned no facts".into(),
                },
            ));
        };

        stage(&device.hostname, SyncStage::Normalizing);
        let spec = Dialect::resolve(device.platform, device.model.as_deref()).spec();
        let status_text = spec.status_command.and_then(|cmd| raw.output(cmd));
        let running_config = raw.output(spec.running_config_command).unwrap_or_default();
        let facts = normalize(device, &raw, status_text, running_config)
            .map_err(|e| SyncError::new(SyncStage::Normalizing, e))?;
        for err in &facts.parse_errors {
            debug!(device = %device.hostname, error = %err, "skipped unparseable line");
        }

        stage(&device.hostname, SyncStage::Upserting);
        let now = Utc::now();
        let store = &self.inner.store;
        let updated = self
            .refresh_metadata(&device.hostname, &facts.device, now)
            .map_err(|e| SyncError::new(SyncStage::Upserting, e))?;
        let id = updated.id;

        let removed = || {
            SyncError::new(
                SyncStage::Upserting,
                CoreError::DeviceNotFound {
                    identifier: device.hostname.clone(),
                },
            )
        };
        let report = SyncReport {
            interfaces: store
                .reconcile_interfaces(id, facts.interfaces, now)
                .ok_or_else(removed)?,
            macs: store.reconcile_macs(id, facts.macs, now).ok_or_else(removed)?,
            arps: store.reconcile_arps(id, facts.arps, now).ok_or_else(removed)?,
            ip_interfaces: store
                .reconcile_ip_interfaces(id, facts.ip_interfaces, now)
                .ok_or_else(removed)?,
            parse_errors: facts.parse_errors,
            device: updated,
        };

        stage(&device.hostname, SyncStage::Done);
        info!(
            device = %device.hostname,
            interfaces = report.interfaces.changed(),
            macs = report.macs.changed(),
            arps = report.arps.changed(),
            ip_interfaces = report.ip_interfaces.changed(),
            "device synced"
        );
        Ok(report)
    }

    /// Write `get_facts` metadata into the stored device. Fails if the
    /// device was removed while its sync was in flight.
    fn refresh_metadata(
        &self,
        hostname: &str,
        facts: &DeviceFacts,
        now: chrono::DateTime<Utc>,
    ) -> Result<Device, CoreError> {
        self.inner
            .store
            .modify_device(hostname, |device| {
                take(&mut device.model, &facts.model);
                take(&mut device.vendor, &facts.vendor);
                take(&mut device.os_version, &facts.os_version);
                take(&mut device.serial_number, &facts.serial_number);
                device.last_synced = Some(now);
                device.updated_at = now;
            })
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: hostname.to_owned(),
            })
    }

    /// Re-sync every device on a fixed interval until `cancel` fires.
    ///
    /// The first pass runs immediately. `on_cycle` sees each pass's results.
    pub async fn run_periodic<F>(&self, every: Duration, cancel: &CancellationToken, mut on_cycle: F)
    where
        F: FnMut(&SyncResults),
    {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    let results = self.sync_all_devices().await;
                    let failed = results.values().filter(|r| r.is_err()).count();
                    info!(devices = results.len(), failed, "periodic sync pass complete");
                    on_cycle(&results);
                }
            }
        }
    }

    // ── Interface changes ────────────────────────────────────────

    /// Push an interface change to the device, then record the requested
    /// values locally without re-reading the device.
    pub async fn push_interface_change(
        &self,
        identifier: &str,
        port: &str,
        request: &InterfaceChangeRequest,
    ) -> Result<Stored<InterfaceRecord>, PushError> {
        let device = self
            .device(identifier)
            .map_err(|e| PushError::new(PushStage::Generating, e))?;
        let spec = Dialect::resolve(device.platform, device.model.as_deref()).spec();
        let port = spec.normalize_port(port);
        let store = &self.inner.store;
        let existing = store.interface(device.id, &port);

        // An omitted description is re-sent so the device keeps it.
        let mut request = request.clone();
        if request.description.is_none() {
            request.description = existing
                .as_ref()
                .map(|r| r.description.trim())
                .filter(|d| !d.is_empty())
                .map(str::to_owned);
        }
        let plan = generate(&device, &port, &request)
            .map_err(|e| PushError::new(PushStage::Generating, e))?;
        debug!(device = %device.hostname, lines = plan.lines.len(), commit = plan.requires_commit, "interface change generated");

        let target = self
            .snapshot()
            .get(&device.hostname)
            .ok_or_else(|| CoreError::DeviceNotFound {
                identifier: device.hostname.clone(),
            })
            .and_then(|entry| entry.target(&self.inner.config))
            .map_err(|e| PushError::new(PushStage::Pushing, e))?;

        let operation = Operation::PushConfig(ConfigPush {
            lines: plan.lines,
            commit: plan.requires_commit,
        });
        let outcome = self
            .inner
            .orchestrator
            .run(&[target], &operation)
            .await
            .remove(&device.hostname)
            .unwrap_or_else(|| {
                Err(SessionError::Aborted {
                    message: "no result for device".into(),
                })
            });
        if let Err(e) = outcome {
            let stage = if matches!(e, SessionError::Commit { .. }) {
                PushStage::Committing
            } else {
                PushStage::Pushing
            };
            return Err(PushError::new(stage, e));
        }

        let mut record = store
            .interface(device.id, &port)
            .map_or_else(|| InterfaceRecord::with_defaults(&port), |r| r.data.clone());
        apply_change(&mut record, &request);

        let stored = store
            .put_interface(device.id, record, Utc::now())
            .ok_or_else(|| {
                PushError::new(
                    PushStage::Recording,
                    CoreError::DeviceNotFound {
                        identifier: device.hostname.clone(),
                    },
                )
            })?;
        info!(device = %device.hostname, port = %stored.port, mode = %stored.mode, "interface change applied");
        Ok(stored)
    }

    // ── Group commands ───────────────────────────────────────────

    /// Run a show command or push config lines on every member of a group.
    pub async fn run_group_command(
        &self,
        group: &str,
        command: &GroupCommand,
    ) -> Result<GroupResults, CoreError> {
        if self.inner.store.group(group).is_none() {
            return Err(CoreError::GroupNotFound {
                name: group.to_owned(),
            });
        }
        let invalid = match command {
            GroupCommand::Show(text) => text.trim().is_empty(),
            GroupCommand::Config(lines) => lines.iter().all(|l| l.trim().is_empty()),
        };
        if invalid {
            return Err(CoreError::ValidationFailed {
                message: "command text must not be empty".into(),
            });
        }

        let snapshot = self.snapshot();
        let members: Vec<_> = snapshot.in_group(group).collect();
        if members.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: format!("group {group} has no devices"),
            });
        }

        let mut results = GroupResults::new();
        let mut work = Vec::with_capacity(members.len());
        for entry in members {
            let target = match entry.target(&self.inner.config) {
                Ok(target) => target,
                Err(e) => {
                    results.insert(entry.hostname.clone(), Err(e));
                    continue;
                }
            };
            let operation = match command {
                GroupCommand::Show(text) => Operation::RunCommand(text.trim().to_owned()),
                GroupCommand::Config(lines) => Operation::PushConfig(ConfigPush {
                    lines: lines.clone(),
                    commit: Dialect::resolve(entry.platform, entry.model.as_deref())
                        .spec()
                        .requires_commit,
                }),
            };
            work.push((target, operation));
        }

        debug!(group, devices = work.len(), "running group command");
        for (hostname, outcome) in self.inner.orchestrator.run_each(work).await {
            results.insert(hostname, outcome.map(payload_text).map_err(CoreError::from));
        }
        Ok(results)
    }
}

/// Overwrite `field` unless the device reported nothing.
fn take(field: &mut Option<String>, value: &str) {
    if !value.trim().is_empty() {
        *field = Some(value.trim().to_owned());
    }
}

fn stage(hostname: &str, stage: SyncStage) {
    debug!(device = %hostname, %stage, "sync stage");
}

/// Render a session payload as the text shown to an operator.
fn payload_text(payload: Payload) -> String {
    match payload {
        Payload::Output { output } => output,
        Payload::Pushed {
            output,
            commit_output,
        } => [Some(output), commit_output]
            .into_iter()
            .flatten()
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        Payload::Facts(raw) => raw.getters.to_string(),
    }
}

/// Write the requested state into a local interface record.
fn apply_change(record: &mut InterfaceRecord, request: &InterfaceChangeRequest) {
    if let Some(description) = &request.description {
        record.description = description.trim().to_owned();
    }
    record.mode = request.mode;
    match request.mode {
        PortMode::Access => {
            if let Some(vlan) = request.vlan {
                record.vlan = vlan.to_string();
            }
            record.native_vlan = "1".into();
            record.allowed_vlan = "1".into();
        }
        PortMode::Trunk => {
            record.native_vlan = request
                .native_vlan
                .filter(|v| (1..4096).contains(v))
                .map_or_else(|| "1".to_owned(), |v| v.to_string());
            record.allowed_vlan = request
                .allowed_vlans
                .iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(",");
        }
    }
}
