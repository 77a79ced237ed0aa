// ── In-memory transport for tests ──

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;

use super::{DeviceSession, SessionTarget, Transport};
use crate::error::SessionError;
use crate::model::Platform;

/// How a fake device behaves.
#[derive(Debug, Clone, Default)]
pub(crate) enum Behavior {
    #[default]
    Healthy,
    Unreachable,
    /// Every call after open sleeps this long.
    Slow(Duration),
    RejectCommands,
    FailCommit,
}

/// In-memory transport recording every call.
#[derive(Default)]
pub(crate) struct FakeTransport {
    pub behaviors: HashMap<String, Behavior>,
    /// Canned command outputs, keyed by command text.
    pub outputs: HashMap<String, String>,
    /// Canned getter results per hostname.
    pub getters: HashMap<String, serde_json::Value>,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub opened: Arc<AtomicUsize>,
    pub closed: Arc<AtomicUsize>,
    pub in_flight: Arc<AtomicUsize>,
    pub peak: Arc<AtomicUsize>,
}

impl FakeTransport {
    pub(crate) fn with(mut self, host: &str, behavior: Behavior) -> Self {
        self.behaviors.insert(host.into(), behavior);
        self
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

struct FakeSession {
    host: String,
    behavior: Behavior,
    outputs: HashMap<String, String>,
    getters: serde_json::Value,
    calls: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
}

impl FakeSession {
    async fn step(&self, call: String) -> Result<(), SessionError> {
        self.calls.lock().unwrap().push(format!("{}: {call}", self.host));
        if let Behavior::Slow(delay) = self.behavior {
            tokio::time::sleep(delay).await;
        }
        Ok(())
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn open(&self, target: &SessionTarget) -> Result<Box<dyn DeviceSession>, SessionError> {
        let behavior = self.behaviors.get(&target.hostname).cloned().unwrap_or_default();
        if matches!(behavior, Behavior::Unreachable) {
            return Err(SessionError::Connect {
                message: format!("{} unreachable", target.address),
            });
        }
        self.opened.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        Ok(Box::new(FakeSession {
            host: target.hostname.clone(),
            behavior,
            outputs: self.outputs.clone(),
            getters: self
                .getters
                .get(&target.hostname)
                .cloned()
                .unwrap_or_else(|| serde_json::json!({})),
            calls: Arc::clone(&self.calls),
            closed: Arc::clone(&self.closed),
            in_flight: Arc::clone(&self.in_flight),
        }))
    }
}

#[async_trait]
impl DeviceSession for FakeSession {
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        self.step(format!("command {command}")).await?;
        if matches!(self.behavior, Behavior::RejectCommands) {
            return Err(SessionError::Command {
                message: format!("% Invalid input: {command}"),
            });
        }
        Ok(self
            .outputs
            .get(command)
            .cloned()
            .unwrap_or_else(|| format!("{} output", self.host)))
    }

    async fn send_config_lines(&mut self, lines: &[String]) -> Result<String, SessionError> {
        for line in lines {
            self.step(format!("config {line}")).await?;
        }
        if matches!(self.behavior, Behavior::RejectCommands) {
            return Err(SessionError::Command {
                message: "line rejected".into(),
            });
        }
        Ok(String::new())
    }

    async fn commit(&mut self) -> Result<String, SessionError> {
        self.step("commit".into()).await?;
        if matches!(self.behavior, Behavior::FailCommit) {
            return Err(SessionError::Command {
                message: "commit check failed".into(),
            });
        }
        Ok("commit complete".into())
    }

    async fn get_structured_facts(
        &mut self,
        getters: &[String],
    ) -> Result<serde_json::Value, SessionError> {
        self.step(format!("getters {}", getters.join(","))).await?;
        Ok(self.getters.clone())
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        self.calls.lock().unwrap().push(format!("{}: close", self.host));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

pub(crate) fn target(host: &str) -> SessionTarget {
    SessionTarget {
        hostname: host.into(),
        address: format!("{host}.mgmt"),
        port: None,
        platform: Platform::Nxos,
        username: "netops".into(),
        password: SecretString::from("pw".to_string()),
    }
}
