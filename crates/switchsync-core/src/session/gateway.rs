// ── Gateway-backed transport ──
//
// Each device session maps onto one gateway session id. All gateway
// errors are folded into `SessionError` through its `From` impl.

use async_trait::async_trait;
use secrecy::ExposeSecret;
use switchsync_api::{GatewayClient, OpenSessionRequest};
use tracing::debug;

use super::{DeviceSession, SessionTarget, Transport};
use crate::error::SessionError;

/// [`Transport`] that talks to devices through the automation gateway.
#[derive(Debug, Clone)]
pub struct GatewayTransport {
    client: GatewayClient,
}

impl GatewayTransport {
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for GatewayTransport {
    async fn open(&self, target: &SessionTarget) -> Result<Box<dyn DeviceSession>, SessionError> {
        let platform = target.platform.to_string();
        let request = OpenSessionRequest {
            host: &target.address,
            port: target.port,
            platform: &platform,
            username: &target.username,
            password: target.password.expose_secret(),
        };
        let session_id = self.client.open_session(&request).await?;
        debug!(device = %target.hostname, session_id, "gateway session opened");

        Ok(Box::new(GatewaySession {
            client: self.client.clone(),
            session_id,
        }))
    }
}

struct GatewaySession {
    client: GatewayClient,
    session_id: String,
}

#[async_trait]
impl DeviceSession for GatewaySession {
    async fn send_command(&mut self, command: &str) -> Result<String, SessionError> {
        Ok(self.client.send_command(&self.session_id, command).await?)
    }

    async fn send_config_lines(&mut self, lines: &[String]) -> Result<String, SessionError> {
        Ok(self.client.send_config(&self.session_id, lines).await?)
    }

    async fn commit(&mut self) -> Result<String, SessionError> {
        Ok(self.client.commit(&self.session_id).await?)
    }

    async fn get_structured_facts(
        &mut self,
        getters: &[String],
    ) -> Result<serde_json::Value, SessionError> {
        Ok(self.client.run_getters(&self.session_id, getters).await?)
    }

    async fn close(&mut self) -> Result<(), SessionError> {
        Ok(self.client.close_session(&self.session_id).await?)
    }
}
