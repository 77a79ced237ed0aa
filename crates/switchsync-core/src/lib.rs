// switchsync-core: Inventory reconciliation between switches and the local store.

pub mod command;
pub mod config;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod model;
pub mod normalize;
pub mod parse;
pub mod session;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::requests::*;
pub use command::{CommandPlan, generate};
pub use config::{Credential, EngineConfig};
pub use dialect::{Dialect, DialectSpec, StanzaShape};
pub use engine::{
    Engine, GroupResults, PushError, PushStage, SyncError, SyncReport, SyncResults, SyncStage,
};
pub use error::{CommandGenError, CoreError, NormalizeError, SessionError};
pub use normalize::{CanonicalFactSet, DeviceFacts, normalize};
pub use parse::{ParseError, ParseReport, PartialInterfaceRecord};
pub use session::{
    ConfigPush, DeviceSession, FactRequest, GatewayTransport, Operation, Payload, RawFacts,
    SessionOrchestrator, SessionTarget, Transport,
};
pub use store::{InventorySnapshot, InventoryStore, ReconcileSummary, SnapshotEntry, Stored};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ArpEntry, Device, EntityId, Group, InterfaceRecord, IpInterfaceEntry, LinkStatus,
    MacAddress, MacTableEntry, Platform, PortMode,
};
