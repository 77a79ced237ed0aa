//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use switchsync_config::ConfigError;
use switchsync_core::{CoreError, PushError, SessionError, SyncError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Device sessions ──────────────────────────────────────────────
    #[error("Could not connect: {message}")]
    #[diagnostic(
        code(switchsync::connection_failed),
        help(
            "Check that the gateway is running and can reach the device.\n\
             Gateway URL comes from [gateway] url or --gateway."
        )
    )]
    ConnectionFailed { message: String },

    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(switchsync::auth_failed),
        help(
            "Verify the device credential or the gateway API key.\n\
             Run: switchsync config show"
        )
    )]
    AuthFailed { message: String },

    #[error("Device rejected the request: {message}")]
    #[diagnostic(code(switchsync::device_error))]
    DeviceError { message: String },

    #[error("Timed out: {message}")]
    #[diagnostic(
        code(switchsync::timeout),
        help("Raise [defaults] device_timeout or check device responsiveness.")
    )]
    Timeout { message: String },

    #[error("{action} of {device} failed while {stage}")]
    #[diagnostic(code(switchsync::stage_failed))]
    StageFailed {
        action: &'static str,
        device: String,
        stage: String,
        #[source]
        #[diagnostic_source]
        cause: Box<CliError>,
    },

    #[error("{failed} of {total} devices failed")]
    #[diagnostic(
        code(switchsync::partial_failure),
        help("Rerun with -v for per-device errors.")
    )]
    PartialFailure { failed: usize, total: usize },

    // ── Inventory ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(switchsync::not_found),
        help("Run: switchsync {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(code(switchsync::conflict))]
    Conflict { message: String },

    #[error("Unusable device data: {message}")]
    #[diagnostic(code(switchsync::data))]
    Data { message: String },

    #[error("Inventory file error: {message}")]
    #[diagnostic(
        code(switchsync::inventory),
        help("Check the inventory path, or pass --inventory to use another file.")
    )]
    Inventory { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(switchsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    #[diagnostic(
        code(switchsync::config),
        help("Create or fix the config with: switchsync config init")
    )]
    Configuration { message: String },

    #[error(transparent)]
    #[diagnostic(code(switchsync::config_file))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(switchsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::StageFailed { cause, .. } => cause.exit_code(),
            _ => exit_code::GENERAL,
        }
    }
}

// Lets `#[diagnostic_source]` borrow a boxed `CliError` as `dyn Diagnostic`.
impl std::borrow::Borrow<dyn Diagnostic> for Box<CliError> {
    fn borrow(&self) -> &(dyn Diagnostic + 'static) {
        self.as_ref()
    }
}

// ── Core → CLI mapping ───────────────────────────────────────────────

impl From<SessionError> for CliError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Connect { message } => Self::ConnectionFailed { message },
            SessionError::Auth { message } => Self::AuthFailed { message },
            SessionError::Timeout { message } => Self::Timeout { message },
            SessionError::Commit { message } => Self::DeviceError {
                message: format!("commit failed: {message}"),
            },
            SessionError::Command { message } | SessionError::Aborted { message } => {
                Self::DeviceError { message }
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Session(e) => e.into(),

            CoreError::DeviceNotFound { identifier } => Self::NotFound {
                resource_type: "device".into(),
                identifier,
                list_command: "devices list".into(),
            },

            CoreError::InterfaceNotFound { device, port } => Self::NotFound {
                resource_type: "interface".into(),
                identifier: port,
                list_command: format!("interfaces list {device}"),
            },

            CoreError::GroupNotFound { name } => Self::NotFound {
                resource_type: "group".into(),
                identifier: name,
                list_command: "groups list".into(),
            },

            CoreError::Conflict { message } => Self::Conflict { message },

            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::CommandGen(e) => Self::Validation {
                field: "interface change".into(),
                reason: e.to_string(),
            },

            e @ (CoreError::Parse(_) | CoreError::Normalize(_)) => Self::Data {
                message: e.to_string(),
            },

            CoreError::Persistence { message } => Self::Inventory { message },

            CoreError::Config { message } => Self::Configuration { message },
        }
    }
}

impl From<SyncError> for CliError {
    fn from(err: SyncError) -> Self {
        Self::StageFailed {
            action: "sync",
            device: String::new(),
            stage: err.stage.to_string(),
            cause: Box::new(err.source.into()),
        }
    }
}

impl From<PushError> for CliError {
    fn from(err: PushError) -> Self {
        Self::StageFailed {
            action: "interface change",
            device: String::new(),
            stage: err.stage.to_string(),
            cause: Box::new(err.source.into()),
        }
    }
}

impl CliError {
    /// Name the device a stage failure belongs to.
    pub fn on_device(self, hostname: &str) -> Self {
        match self {
            Self::StageFailed {
                action,
                stage,
                cause,
                ..
            } => Self::StageFailed {
                action,
                device: hostname.to_owned(),
                stage,
                cause,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchsync_core::{CommandGenError, PushStage, SyncStage};

    #[test]
    fn session_failures_keep_their_exit_codes() {
        let err: CliError = CoreError::Session(SessionError::Connect {
            message: "refused".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);

        let err: CliError = CoreError::Session(SessionError::Timeout {
            message: "slow".into(),
        })
        .into();
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn stage_failures_inherit_the_cause_exit_code() {
        let err: CliError = SyncError {
            stage: SyncStage::Fetching,
            source: CoreError::Session(SessionError::Auth {
                message: "denied".into(),
            }),
        }
        .into();
        let err = err.on_device("sw1");
        assert_eq!(err.exit_code(), exit_code::AUTH);
        assert_eq!(err.to_string(), "sync of sw1 failed while fetching");

        let err: CliError = PushError {
            stage: PushStage::Generating,
            source: CoreError::CommandGen(CommandGenError::MissingAccessVlan),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn lookups_map_to_not_found() {
        let err: CliError = CoreError::GroupNotFound { name: "dc9".into() }.into();
        assert_eq!(err.exit_code(), exit_code::NOT_FOUND);
        assert!(err.to_string().contains("dc9"));
    }
}
