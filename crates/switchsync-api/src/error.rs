use serde::Deserialize;
use thiserror::Error;

/// Category of a device-side failure reported by the gateway.
///
/// The gateway tags `rc = "error"` envelopes with a `kind` so callers can
/// tell an unreachable device apart from one that rejected a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceErrorKind {
    Connect,
    Auth,
    Command,
    Commit,
    Timeout,
}

impl std::fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Auth => "auth",
            Self::Command => "command",
            Self::Commit => "commit",
            Self::Timeout => "timeout",
        };
        f.write_str(s)
    }
}

/// Top-level error type for the `switchsync-api` crate.
///
/// Gateway-level failures (transport, TLS, authentication against the
/// gateway itself) are kept apart from device-level failures the gateway
/// relays on behalf of a switch. `switchsync-core` maps both into
/// session errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Gateway authentication ──────────────────────────────────────
    /// The gateway rejected our API key (HTTP 401).
    #[error("Gateway authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The gateway gave up waiting on the device (HTTP 504).
    #[error("Gateway timed out: {message}")]
    GatewayTimeout { message: String },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Non-success HTTP status, or an error envelope without a device kind.
    #[error("Gateway error: {message}")]
    Gateway { message: String },

    // ── Device ──────────────────────────────────────────────────────
    /// Failure reported by the device behind the gateway.
    #[error("Device {kind} error: {message}")]
    Device {
        kind: DeviceErrorKind,
        message: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the request ran out of time, either on our side
    /// or on the gateway's.
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout(),
            Self::GatewayTimeout { .. } => true,
            Self::Device { kind, .. } => *kind == DeviceErrorKind::Timeout,
            _ => false,
        }
    }

    /// Returns `true` if the gateway itself could not be reached.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// The device-side error kind, if this error came from a device.
    pub fn device_kind(&self) -> Option<DeviceErrorKind> {
        match self {
            Self::Device { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
