// Gateway session endpoints
//
// One gateway session wraps one SSH/NETCONF connection to a device.
// Open, run commands and getters, push config, commit, close.

use tracing::debug;

use crate::error::Error;
use crate::gateway::client::GatewayClient;
use crate::gateway::models::{
    CommandOutput, CommandRequest, ConfigRequest, GettersRequest, OpenSessionRequest,
    SessionOpened,
};

impl GatewayClient {
    /// Open a device session.
    ///
    /// `POST /api/v1/sessions`
    pub async fn open_session(&self, request: &OpenSessionRequest<'_>) -> Result<String, Error> {
        let url = self.api_url("sessions")?;
        debug!(host = request.host, platform = request.platform, "opening session");
        let opened: SessionOpened = first(self.post(url, request).await?)?;
        Ok(opened.session_id)
    }

    /// Run a single show/exec command and return its raw output.
    ///
    /// `POST /api/v1/sessions/{id}/command`
    pub async fn send_command(&self, session_id: &str, command: &str) -> Result<String, Error> {
        let url = self.api_url(&format!("sessions/{session_id}/command"))?;
        debug!(session_id, command, "sending command");
        let out: CommandOutput = first(self.post(url, &CommandRequest { command }).await?)?;
        Ok(out.output)
    }

    /// Send configuration lines in order, within one config session.
    ///
    /// `POST /api/v1/sessions/{id}/config`
    pub async fn send_config(&self, session_id: &str, lines: &[String]) -> Result<String, Error> {
        let url = self.api_url(&format!("sessions/{session_id}/config"))?;
        debug!(session_id, lines = lines.len(), "sending config lines");
        let out: CommandOutput = first(self.post(url, &ConfigRequest { lines }).await?)?;
        Ok(out.output)
    }

    /// Commit the candidate configuration.
    ///
    /// `POST /api/v1/sessions/{id}/commit`
    pub async fn commit(&self, session_id: &str) -> Result<String, Error> {
        let url = self.api_url(&format!("sessions/{session_id}/commit"))?;
        debug!(session_id, "committing");
        let out: CommandOutput = first(self.post(url, &serde_json::json!({})).await?)?;
        Ok(out.output)
    }

    /// Run structured getters. Returns an object keyed by getter name.
    ///
    /// `POST /api/v1/sessions/{id}/getters`
    pub async fn run_getters(
        &self,
        session_id: &str,
        getters: &[String],
    ) -> Result<serde_json::Value, Error> {
        let url = self.api_url(&format!("sessions/{session_id}/getters"))?;
        debug!(session_id, ?getters, "running getters");
        first(self.post(url, &GettersRequest { getters }).await?)
    }

    /// Close a device session.
    ///
    /// `DELETE /api/v1/sessions/{id}`
    pub async fn close_session(&self, session_id: &str) -> Result<(), Error> {
        let url = self.api_url(&format!("sessions/{session_id}"))?;
        debug!(session_id, "closing session");
        let _: Vec<serde_json::Value> = self.delete(url).await?;
        Ok(())
    }
}

fn first<T>(data: Vec<T>) -> Result<T, Error> {
    data.into_iter().next().ok_or_else(|| Error::Deserialization {
        message: "gateway returned an empty data array".into(),
        body: String::new(),
    })
}
