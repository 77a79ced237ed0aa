//! CLI configuration -- thin wrapper around `switchsync_config`.
//!
//! Adds the `GlobalOpts` overrides (--config-file, --inventory, --gateway,
//! --insecure, --timeout) and builds the engine handlers work with.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use switchsync_api::{GatewayClient, TlsMode};
use switchsync_core::{Engine, EngineConfig, GatewayTransport, InventoryStore};

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use switchsync_config::{Config, CredentialProfile};

// ── Paths ───────────────────────────────────────────────────────────

/// Config file in effect: `--config-file`, else the platform default.
pub fn config_file(global: &GlobalOpts) -> PathBuf {
    global
        .config_file
        .clone()
        .unwrap_or_else(switchsync_config::config_path)
}

/// Inventory file in effect: `--inventory`, else the config's.
pub fn inventory_file(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global
        .inventory
        .clone()
        .unwrap_or_else(|| switchsync_config::inventory_path(cfg))
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(switchsync_config::load_config_from(&config_file(global))?)
}

// ── Engine context ──────────────────────────────────────────────────

/// Everything an inventory-bound command needs.
pub struct Context {
    pub engine: Engine,
    inventory: PathBuf,
}

impl Context {
    /// Load the inventory and build an engine.
    ///
    /// Credentials are only resolved when `sessions` is set, so offline
    /// commands never touch the keyring or password env vars.
    pub fn open(global: &GlobalOpts, sessions: bool) -> Result<Self, CliError> {
        let cfg = load(global)?;
        let inventory = inventory_file(global, &cfg);
        let store = Arc::new(InventoryStore::load(&inventory)?);

        let engine_config = if sessions {
            switchsync_config::engine_config(&cfg)?
        } else {
            EngineConfig {
                max_concurrency: cfg.defaults.max_concurrency.max(1),
                device_timeout: Duration::from_secs(cfg.defaults.device_timeout.max(1)),
                ..EngineConfig::default()
            }
        };

        let transport = gateway_transport(&cfg, global, sessions)?;
        tracing::debug!(inventory = %inventory.display(), sessions, "engine ready");
        Ok(Self {
            engine: Engine::new(engine_config, Arc::new(transport), store),
            inventory,
        })
    }

    /// Persist the inventory after a mutation.
    pub fn save(&self) -> Result<(), CliError> {
        Ok(self.engine.store().save(&self.inventory)?)
    }
}

fn gateway_transport(
    cfg: &Config,
    global: &GlobalOpts,
    sessions: bool,
) -> Result<GatewayTransport, CliError> {
    let url_str = global.gateway.as_deref().unwrap_or(&cfg.gateway.url);
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "gateway".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;

    let mut transport = if sessions {
        switchsync_config::transport_config(cfg)
    } else {
        switchsync_api::TransportConfig::default()
    };
    if global.insecure {
        transport.tls = TlsMode::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        transport.timeout = Duration::from_secs(secs);
    }

    let client = GatewayClient::new(url, &transport).map_err(|e| CliError::ConnectionFailed {
        message: e.to_string(),
    })?;
    Ok(GatewayTransport::new(client))
}
