// Gateway wire types
//
// Every gateway response is wrapped in `GatewayResponse<T>`. Request bodies
// borrow from the caller so credentials are exposed only for the lifetime
// of the serialization.

use serde::{Deserialize, Serialize};

use crate::error::DeviceErrorKind;

// ── Response Envelope ────────────────────────────────────────────────

/// Standard gateway response envelope.
///
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional", "kind": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct GatewayResponse<T> {
    pub meta: Meta,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

/// Envelope metadata. `rc == "ok"` means success; on error `kind` says
/// which side of the device conversation failed.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub kind: Option<DeviceErrorKind>,
}

// ── Requests ─────────────────────────────────────────────────────────

/// Body of `POST /api/v1/sessions`.
#[derive(Debug, Serialize)]
pub struct OpenSessionRequest<'a> {
    pub host: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Driver name understood by the gateway (`ios`, `nxos`, `junos`).
    pub platform: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct CommandRequest<'a> {
    pub command: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ConfigRequest<'a> {
    pub lines: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct GettersRequest<'a> {
    pub getters: &'a [String],
}

// ── Responses ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct SessionOpened {
    pub session_id: String,
}

/// Raw text returned by a command, config push, or commit.
#[derive(Debug, Clone, Deserialize)]
pub struct CommandOutput {
    #[serde(default)]
    pub output: String,
}
