// ── Session orchestrator ──
//
// One spawned task per device, gated by a semaphore. The per-device
// deadline starts once a worker slot is acquired and covers session open
// plus the operation; close always runs afterwards under its own short
// budget. Outcomes never influence sibling devices.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use tokio::sync::Semaphore;
use tokio::time::{Instant, timeout, timeout_at};
use tracing::{debug, warn};

use super::{DeviceSession, Operation, Payload, RawFacts, SessionTarget, Transport};
use crate::config::EngineConfig;
use crate::error::SessionError;

const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

/// Per-device outcomes keyed by hostname.
pub type SessionResults = BTreeMap<String, Result<Payload, SessionError>>;

/// Runs operations against many devices concurrently.
#[derive(Clone)]
pub struct SessionOrchestrator {
    transport: Arc<dyn Transport>,
    permits: Arc<Semaphore>,
    device_timeout: Duration,
}

impl SessionOrchestrator {
    pub fn new(transport: Arc<dyn Transport>, max_concurrency: usize, device_timeout: Duration) -> Self {
        Self {
            transport,
            permits: Arc::new(Semaphore::new(max_concurrency.max(1))),
            device_timeout,
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &EngineConfig) -> Self {
        Self::new(transport, config.max_concurrency, config.device_timeout)
    }

    /// Run the same operation against every target.
    pub async fn run(&self, targets: &[SessionTarget], operation: &Operation) -> SessionResults {
        let work = targets
            .iter()
            .map(|target| (target.clone(), operation.clone()))
            .collect();
        self.run_each(work).await
    }

    /// Run a per-target operation. Duplicate hostnames keep the last outcome.
    pub async fn run_each(&self, work: Vec<(SessionTarget, Operation)>) -> SessionResults {
        let (hostnames, handles): (Vec<_>, Vec<_>) = work
            .into_iter()
            .map(|(target, operation)| {
                let hostname = target.hostname.clone();
                let this = self.clone();
                let handle = tokio::spawn(async move { this.run_one(target, operation).await });
                (hostname, handle)
            })
            .unzip();

        let mut results = BTreeMap::new();
        for (hostname, joined) in hostnames.into_iter().zip(join_all(handles).await) {
            let outcome = joined.unwrap_or_else(|e| {
                Err(SessionError::Aborted {
                    message: e.to_string(),
                })
            });
            match &outcome {
                Ok(_) => debug!(device = %hostname, "device operation succeeded"),
                Err(e) => warn!(device = %hostname, error = %e, "device operation failed"),
            }
            results.insert(hostname, outcome);
        }
        results
    }

    async fn run_one(&self, target: SessionTarget, operation: Operation) -> Result<Payload, SessionError> {
        let _permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|_| SessionError::Aborted {
                message: "worker pool closed".into(),
            })?;

        let deadline = Instant::now() + self.device_timeout;
        let mut session = timeout_at(deadline, self.transport.open(&target))
            .await
            .map_err(|_| self.timed_out("opening session"))??;

        let outcome = timeout_at(deadline, execute(session.as_mut(), &operation))
            .await
            .unwrap_or_else(|_| Err(self.timed_out("running operation")));

        match timeout(CLOSE_TIMEOUT, session.close()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(device = %target.hostname, error = %e, "session close failed"),
            Err(_) => warn!(device = %target.hostname, "session close timed out"),
        }

        outcome
    }

    fn timed_out(&self, stage: &str) -> SessionError {
        SessionError::Timeout {
            message: format!("{stage} exceeded {}s", self.device_timeout.as_secs_f64()),
        }
    }
}

async fn execute(session: &mut dyn DeviceSession, operation: &Operation) -> Result<Payload, SessionError> {
    match operation {
        Operation::GetFacts(request) => {
            let getters = if request.getters.is_empty() {
                serde_json::Value::Object(serde_json::Map::new())
            } else {
                session.get_structured_facts(&request.getters).await?
            };
            let mut outputs = BTreeMap::new();
            for command in &request.commands {
                let output = session.send_command(command).await?;
                outputs.insert(command.clone(), output);
            }
            Ok(Payload::Facts(RawFacts { getters, outputs }))
        }
        Operation::RunCommand(command) => Ok(Payload::Output {
            output: session.send_command(command).await?,
        }),
        Operation::PushConfig(push) => {
            let output = session.send_config_lines(&push.lines).await?;
            let commit_output = if push.commit {
                Some(session.commit().await.map_err(as_commit_error)?)
            } else {
                None
            };
            Ok(Payload::Pushed {
                output,
                commit_output,
            })
        }
    }
}

/// Anything going wrong during commit is a commit failure, except a timeout.
fn as_commit_error(err: SessionError) -> SessionError {
    match err {
        SessionError::Timeout { .. } | SessionError::Commit { .. } => err,
        other => SessionError::Commit {
            message: other.to_string(),
        },
    }
}
