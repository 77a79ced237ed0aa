//! Shared configuration for the switchsync binary.
//!
//! TOML file + environment layering, credential resolution (env, keyring,
//! plaintext) and translation into `switchsync_core::EngineConfig` and
//! `switchsync_api::TransportConfig`.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use switchsync_api::{TlsMode, TransportConfig};
use switchsync_core::{Credential, EngineConfig};
use switchsync_core::config::{DEFAULT_DEVICE_TIMEOUT, DEFAULT_MAX_CONCURRENCY};

const KEYRING_SERVICE: &str = "switchsync";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no password available for credential '{name}'")]
    NoCredentials { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Path to the persisted inventory file. Defaults to the platform
    /// data directory.
    pub inventory: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub gateway: Gateway,

    /// Named device credentials.
    #[serde(default)]
    pub credentials: BTreeMap<String, CredentialProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Gateway request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-device budget in seconds (session open + operation).
    #[serde(default = "default_device_timeout")]
    pub device_timeout: u64,

    /// Credential used by devices that do not name one.
    pub credential: Option<String>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            max_concurrency: default_max_concurrency(),
            device_timeout: default_device_timeout(),
            credential: None,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    120
}
fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}
fn default_device_timeout() -> u64 {
    DEFAULT_DEVICE_TIMEOUT.as_secs()
}

/// Where the device-automation gateway lives and how to reach it.
#[derive(Debug, Deserialize, Serialize)]
pub struct Gateway {
    #[serde(default = "default_gateway_url")]
    pub url: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to a custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    #[serde(default)]
    pub insecure: bool,
}

impl Default for Gateway {
    fn default() -> Self {
        Self {
            url: default_gateway_url(),
            api_key: None,
            api_key_env: None,
            ca_cert: None,
            insecure: false,
        }
    }
}

fn default_gateway_url() -> String {
    "http://127.0.0.1:8080".into()
}

/// A named device login.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CredentialProfile {
    pub username: String,

    /// Password (plaintext; prefer keyring or env var).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "switchsync", "switchsync")
}

fn dirs_fallback(kind: &str) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(kind);
    p.push("switchsync");
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback(".config").join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Where the inventory file lives: the configured path, else the
/// platform data directory.
pub fn inventory_path(config: &Config) -> PathBuf {
    config.inventory.clone().unwrap_or_else(|| {
        project_dirs().map_or_else(
            || dirs_fallback(".local/share").join("inventory.json"),
            |dirs| dirs.data_dir().join("inventory.json"),
        )
    })
}

// ── Loading and saving ──────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path. A missing file contributes nothing.
///
/// Environment overrides use `SWITCHSYNC_` with `__` between sections,
/// e.g. `SWITCHSYNC_DEFAULTS__MAX_CONCURRENCY=4`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SWITCHSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

fn keyring_secret(entry: &str) -> Option<SecretString> {
    keyring::Entry::new(KEYRING_SERVICE, entry)
        .ok()?
        .get_password()
        .ok()
        .map(SecretString::from)
}

/// Store a secret in the system keyring under `entry`
/// (`<credential>/password` or `gateway/api-key`).
pub fn store_secret(entry: &str, secret: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, entry)?.set_password(secret)?;
    Ok(())
}

/// Resolve a credential's password: `password_env` → keyring → plaintext.
pub fn resolve_password(name: &str, profile: &CredentialProfile) -> Result<SecretString, ConfigError> {
    resolve_password_with(name, profile, |var| std::env::var(var).ok())
}

fn resolve_password_with(
    name: &str,
    profile: &CredentialProfile,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Named env var
    if let Some(value) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(value));
    }

    // 2. System keyring
    if let Some(secret) = keyring_secret(&format!("{name}/password")) {
        return Ok(secret);
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials { name: name.into() })
}

/// Resolve the gateway API key, if one is configured anywhere.
pub fn resolve_gateway_key(gateway: &Gateway) -> Option<SecretString> {
    if let Some(value) = gateway
        .api_key_env
        .as_deref()
        .and_then(|var| std::env::var(var).ok())
    {
        return Some(SecretString::from(value));
    }
    keyring_secret("gateway/api-key").or_else(|| gateway.api_key.clone().map(SecretString::from))
}

// ── Translation ─────────────────────────────────────────────────────

/// Build the core engine configuration.
///
/// Every named credential must resolve; `max_concurrency` is clamped to
/// at least 1.
pub fn engine_config(config: &Config) -> Result<EngineConfig, ConfigError> {
    engine_config_with(config, resolve_password)
}

fn engine_config_with(
    config: &Config,
    password: impl Fn(&str, &CredentialProfile) -> Result<SecretString, ConfigError>,
) -> Result<EngineConfig, ConfigError> {
    if let Some(ref name) = config.defaults.credential {
        if !config.credentials.contains_key(name) {
            return Err(ConfigError::Validation {
                field: "defaults.credential".into(),
                reason: format!("no [credentials.{name}] section"),
            });
        }
    }

    let mut credentials = HashMap::with_capacity(config.credentials.len());
    for (name, profile) in &config.credentials {
        credentials.insert(
            name.clone(),
            Credential {
                username: profile.username.clone(),
                password: password(name, profile)?,
            },
        );
    }

    Ok(EngineConfig {
        max_concurrency: config.defaults.max_concurrency.max(1),
        device_timeout: Duration::from_secs(config.defaults.device_timeout.max(1)),
        credentials,
        default_credential: config.defaults.credential.clone(),
    })
}

/// Parse the gateway base URL.
pub fn gateway_url(config: &Config) -> Result<Url, ConfigError> {
    config
        .gateway
        .url
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "gateway.url".into(),
            reason: format!("invalid URL: {}", config.gateway.url),
        })
}

/// Build the HTTP transport configuration for the gateway client.
pub fn transport_config(config: &Config) -> TransportConfig {
    let gateway = &config.gateway;
    let tls = if gateway.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = gateway.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    TransportConfig {
        tls,
        timeout: Duration::from_secs(config.defaults.timeout),
        api_key: resolve_gateway_key(gateway),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn lab(password: Option<&str>, password_env: Option<&str>) -> CredentialProfile {
        CredentialProfile {
            username: "netops".into(),
            password: password.map(str::to_owned),
            password_env: password_env.map(str::to_owned),
        }
    }

    #[test]
    fn file_values_layer_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
inventory = "/var/lib/switchsync/inventory.json"

[defaults]
max_concurrency = 4
credential = "lab"

[gateway]
url = "https://gw.example.net"
insecure = true

[credentials.lab]
username = "netops"
password_env = "LAB_PASSWORD"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.defaults.max_concurrency, 4);
        assert_eq!(config.defaults.device_timeout, 60);
        assert_eq!(config.defaults.output, "table");
        assert_eq!(config.gateway.url, "https://gw.example.net");
        assert_eq!(
            inventory_path(&config),
            PathBuf::from("/var/lib/switchsync/inventory.json")
        );
        assert_eq!(config.credentials["lab"].password_env.as_deref(), Some("LAB_PASSWORD"));
        assert!(matches!(transport_config(&config).tls, TlsMode::DangerAcceptInvalid));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.defaults.max_concurrency, DEFAULT_MAX_CONCURRENCY);
        assert!(config.credentials.is_empty());
        assert_eq!(gateway_url(&config).unwrap().as_str(), "http://127.0.0.1:8080/");
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.credentials.insert("lab".into(), lab(Some("pw"), None));
        config.defaults.credential = Some("lab".into());

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.defaults.credential.as_deref(), Some("lab"));
        assert_eq!(loaded.credentials["lab"].username, "netops");
    }

    #[test]
    fn env_password_wins_over_plaintext() {
        let profile = lab(Some("plain"), Some("LAB_PW"));
        let secret = resolve_password_with("lab", &profile, |var| {
            (var == "LAB_PW").then(|| "from-env".to_owned())
        })
        .unwrap();
        assert_eq!(secret.expose_secret(), "from-env");
    }

    #[test]
    fn unset_env_falls_through_to_plaintext() {
        let profile = lab(Some("plain"), Some("LAB_PW"));
        let secret = resolve_password_with("switchsync-test-absent", &profile, |_| None).unwrap();
        assert_eq!(secret.expose_secret(), "plain");
    }

    #[test]
    fn engine_config_clamps_and_resolves() {
        let mut config = Config::default();
        config.defaults.max_concurrency = 0;
        config.defaults.credential = Some("lab".into());
        config.credentials.insert("lab".into(), lab(None, None));

        let engine = engine_config_with(&config, |_, _| Ok(SecretString::from("pw".to_owned()))).unwrap();
        assert_eq!(engine.max_concurrency, 1);
        assert_eq!(engine.device_timeout, DEFAULT_DEVICE_TIMEOUT);
        assert_eq!(engine.credential(None).unwrap().username, "netops");
    }

    #[test]
    fn unknown_default_credential_is_rejected() {
        let mut config = Config::default();
        config.defaults.credential = Some("missing".into());
        let err = engine_config_with(&config, |_, _| Ok(SecretString::from("pw".to_owned())))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { .. }));
    }

    #[test]
    fn unresolvable_password_fails() {
        let mut config = Config::default();
        config.credentials.insert("lab".into(), lab(None, None));
        let err = engine_config_with(&config, |name, _| {
            Err(ConfigError::NoCredentials { name: name.into() })
        })
        .unwrap_err();
        assert!(err.to_string().contains("lab"));
    }
}
