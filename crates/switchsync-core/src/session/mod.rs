// ── Device sessions ──
//
// The transport seam between the engine and the devices. A `Transport`
// opens one `DeviceSession` per target; the orchestrator fans a single
// operation out across many targets and collects one outcome per device.

mod gateway;
mod orchestrator;
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod testing;

use std::collections::BTreeMap;

use async_trait::async_trait;
use secrecy::SecretString;
use serde::Serialize;

use crate::error::SessionError;
use crate::model::Platform;

pub use gateway::GatewayTransport;
pub use orchestrator::{SessionOrchestrator, SessionResults};

// ── Targets ──────────────────────────────────────────────────────────

/// Everything needed to log in to one device.
#[derive(Debug, Clone)]
pub struct SessionTarget {
    pub hostname: String,
    pub address: String,
    pub port: Option<u16>,
    pub platform: Platform,
    pub username: String,
    pub password: SecretString,
}

// ── Operations ───────────────────────────────────────────────────────

/// Structured getters plus raw show commands, fetched in one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactRequest {
    pub getters: Vec<String>,
    pub commands: Vec<String>,
}

/// Configuration lines to send, in order, and whether to commit after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPush {
    pub lines: Vec<String>,
    pub commit: bool,
}

/// One unit of work against a device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    GetFacts(FactRequest),
    RunCommand(String),
    PushConfig(ConfigPush),
}

/// Raw device output, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RawFacts {
    /// Getter results keyed by getter name.
    pub getters: serde_json::Value,
    /// Command outputs keyed by the command text.
    pub outputs: BTreeMap<String, String>,
}

impl RawFacts {
    pub fn output(&self, command: &str) -> Option<&str> {
        self.outputs.get(command).map(String::as_str)
    }
}

/// Successful result of an [`Operation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Payload {
    Facts(RawFacts),
    Output { output: String },
    Pushed {
        output: String,
        commit_output: Option<String>,
    },
}

// ── Transport seam ───────────────────────────────────────────────────

/// Opens device sessions. Implemented over the automation gateway in
/// production and by in-memory fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn open(&self, target: &SessionTarget) -> Result<Box<dyn DeviceSession>, SessionError>;
}

/// An open connection to one device.
#[async_trait]
pub trait DeviceSession: Send {
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError>;

    /// Send configuration lines in order within one config context.
    async fn send_config_lines(&mut self, lines: &[String]) -> Result<String, SessionError>;

    async fn commit(&mut self) -> Result<String, SessionError>;

    /// Run structured getters; the result is an object keyed by getter name.
    async fn get_structured_facts(
        &mut self,
        getters: &[String],
    ) -> Result<serde_json::Value, SessionError>;

    async fn close(&mut self) -> Result<(), SessionError>;
}
