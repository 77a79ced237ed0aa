// ── Core error types ──
//
// User-facing errors from switchsync-core. Consumers never see HTTP status
// codes or gateway envelopes directly: the `From<switchsync_api::Error>`
// impl folds transport failures into session errors.

use thiserror::Error;

use crate::parse::ParseError;

// ── Session errors ──────────────────────────────────────────────────

/// Failure of one device's unit of work in the session orchestrator.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// Device (or the gateway in front of it) unreachable.
    #[error("Cannot connect: {message}")]
    Connect { message: String },

    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// The device rejected a command or config line.
    #[error("Command rejected: {message}")]
    Command { message: String },

    /// Config lines were accepted but the commit step failed.
    #[error("Commit failed: {message}")]
    Commit { message: String },

    #[error("Timed out: {message}")]
    Timeout { message: String },

    /// The per-device task ended without producing a result.
    #[error("Device task aborted: {message}")]
    Aborted { message: String },
}

impl SessionError {
    /// Short machine-readable label for the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connect { .. } => "connect",
            Self::Auth { .. } => "auth",
            Self::Command { .. } => "command",
            Self::Commit { .. } => "commit",
            Self::Timeout { .. } => "timeout",
            Self::Aborted { .. } => "aborted",
        }
    }
}

impl From<switchsync_api::Error> for SessionError {
    fn from(err: switchsync_api::Error) -> Self {
        use switchsync_api::DeviceErrorKind;

        match err {
            switchsync_api::Error::Authentication { message } => SessionError::Auth {
                message: format!("gateway: {message}"),
            },
            switchsync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    SessionError::Timeout {
                        message: e.to_string(),
                    }
                } else if e.is_connect() {
                    SessionError::Connect {
                        message: format!("gateway unreachable: {e}"),
                    }
                } else {
                    SessionError::Command {
                        message: e.to_string(),
                    }
                }
            }
            switchsync_api::Error::InvalidUrl(e) => SessionError::Connect {
                message: format!("invalid gateway URL: {e}"),
            },
            switchsync_api::Error::Tls(message) => SessionError::Connect {
                message: format!("TLS error: {message}"),
            },
            switchsync_api::Error::GatewayTimeout { message } => SessionError::Timeout { message },
            switchsync_api::Error::Gateway { message } => SessionError::Command { message },
            switchsync_api::Error::Device { kind, message } => match kind {
                DeviceErrorKind::Connect => SessionError::Connect { message },
                DeviceErrorKind::Auth => SessionError::Auth { message },
                DeviceErrorKind::Command => SessionError::Command { message },
                DeviceErrorKind::Commit => SessionError::Commit { message },
                DeviceErrorKind::Timeout => SessionError::Timeout { message },
            },
            switchsync_api::Error::Deserialization { message, body: _ } => SessionError::Command {
                message: format!("unreadable gateway response: {message}"),
            },
        }
    }
}

// ── Normalization errors ────────────────────────────────────────────

/// A structured getter payload did not have the expected shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed `{getter}` payload: {message}")]
pub struct NormalizeError {
    pub getter: String,
    pub message: String,
}

impl NormalizeError {
    pub(crate) fn new(getter: &str, message: impl Into<String>) -> Self {
        Self {
            getter: getter.to_owned(),
            message: message.into(),
        }
    }
}

// ── Command generation errors ───────────────────────────────────────

/// An interface change request is invalid for its requested mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CommandGenError {
    #[error("Access mode requires an access VLAN")]
    MissingAccessVlan,

    #[error("Trunk mode requires at least one allowed VLAN")]
    MissingAllowedVlans,

    #[error("Invalid VLAN id {vlan} (must be 1-4095)")]
    InvalidVlan { vlan: u16 },

    #[error("Port name must not be empty")]
    EmptyPort,
}

// ── Core error ──────────────────────────────────────────────────────

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Device conversation ──────────────────────────────────────────
    #[error(transparent)]
    Session(#[from] SessionError),

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error("Invalid interface change: {0}")]
    CommandGen(#[from] CommandGenError),

    #[error("Inventory store error: {message}")]
    Persistence { message: String },

    // ── Lookup errors ────────────────────────────────────────────────
    #[error("Device not found: {identifier}")]
    DeviceNotFound { identifier: String },

    #[error("Interface not found: {port} on {device}")]
    InterfaceNotFound { device: String, port: String },

    #[error("Group not found: {name}")]
    GroupNotFound { name: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Conflict: {message}")]
    Conflict { message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}
