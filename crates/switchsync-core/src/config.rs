// ── Runtime engine configuration ──
//
// Describes how the engine talks to devices: concurrency bound, per-device
// timeout, and the named credentials devices refer to. Never touches disk;
// switchsync-config builds one of these and hands it in.

use std::collections::HashMap;
use std::time::Duration;

use secrecy::SecretString;

/// Default cap on concurrently open device sessions.
pub const DEFAULT_MAX_CONCURRENCY: usize = 16;

/// Default budget for one device's unit of work (open + operation).
pub const DEFAULT_DEVICE_TIMEOUT: Duration = Duration::from_secs(60);

/// Login material for a device session.
#[derive(Debug, Clone)]
pub struct Credential {
    pub username: String,
    pub password: SecretString,
}

/// Configuration for the reconciliation engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on devices worked on at once. Clamped to at least 1.
    pub max_concurrency: usize,
    /// Per-device timeout covering session open plus the operation.
    pub device_timeout: Duration,
    /// Named credentials, referenced by `Device::credential`.
    pub credentials: HashMap<String, Credential>,
    /// Credential used by devices that do not name one.
    pub default_credential: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            device_timeout: DEFAULT_DEVICE_TIMEOUT,
            credentials: HashMap::new(),
            default_credential: None,
        }
    }
}

impl EngineConfig {
    /// Look up the credential for a device's credential reference.
    pub fn credential(&self, reference: Option<&str>) -> Option<&Credential> {
        let name = reference.or(self.default_credential.as_deref())?;
        self.credentials.get(name)
    }
}
