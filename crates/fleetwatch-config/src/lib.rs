//! Shared configuration for fleetwatch.
//!
//! TOML profiles, credential resolution (env + keyring + plaintext), and
//! translation into the runtime types of `fleetwatch_core`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::HashMap;
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

use fleetwatch_core::{DashboardConfig, StoreConfig, TlsVerification, TrackerConfig};

const KEYRING_SERVICE: &str = "fleetwatch";

/// Public Mapon-compatible API root.
pub const DEFAULT_BASE_URL: &str = "https://mapon.com/api/v1/";

/// Env var consulted for the key-value store token when a profile names
/// none.
pub const STORE_TOKEN_ENV: &str = "FLEETWATCH_STORE_TOKEN";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

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
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named tracking-account profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given on the command line.
    pub fn active_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    /// Request timeout, seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Delay between poll ticks, seconds.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Reach of the first alarm query, minutes.
    #[serde(default = "default_catch_up")]
    pub catch_up_minutes: u32,

    /// Overlap between consecutive alarm queries, minutes.
    #[serde(default = "default_look_back")]
    pub look_back_minutes: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
            poll_interval_secs: default_poll_interval(),
            catch_up_minutes: default_catch_up(),
            look_back_minutes: default_look_back(),
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
    30
}
fn default_poll_interval() -> u64 {
    5
}
fn default_catch_up() -> u32 {
    120
}
fn default_look_back() -> u32 {
    5
}

/// A named tracking account.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Tracking API root.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Skip TLS verification.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Where overrides and clients are kept.
    #[serde(default)]
    pub store: StoreSettings,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            api_key_env: None,
            ca_cert: None,
            insecure: None,
            timeout: None,
            store: StoreSettings::default(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

/// `[profiles.<name>.store]`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StoreSettings {
    /// `"file"` (default), `"memory"`, or `"kv"`.
    #[serde(default)]
    pub backend: StoreBackend,

    /// File backend: document path. Defaults to the platform data dir.
    pub path: Option<PathBuf>,

    /// KV backend: REST endpoint.
    pub url: Option<String>,

    /// KV backend: token (plaintext; prefer keyring or env var).
    pub token: Option<String>,

    /// KV backend: environment variable holding the token.
    pub token_env: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    File,
    Memory,
    Kv,
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "fleetwatch", "fleetwatch")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default file-store location for a profile.
pub fn default_store_path(profile_name: &str) -> PathBuf {
    let file = format!("store-{profile_name}.json");
    project_dirs().map_or_else(
        || dirs_fallback().join(&file),
        |dirs| dirs.data_dir().join(&file),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("fleetwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. A missing file is not an
/// error. Env vars use `__` between levels, e.g.
/// `FLEETWATCH_DEFAULTS__POLL_INTERVAL_SECS=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("FLEETWATCH_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if loading fails.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the tracking API key: env var named by the profile, then the
/// system keyring, then plaintext config.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    resolve_secret(
        profile.api_key_env.as_deref(),
        &format!("{profile_name}/api-key"),
        profile.api_key.as_deref(),
    )
    .ok_or_else(|| ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Resolve the key-value store token, same chain as the API key with
/// [`STORE_TOKEN_ENV`] as the fallback env var.
pub fn resolve_store_token(store: &StoreSettings, profile_name: &str) -> Option<SecretString> {
    resolve_secret(
        Some(store.token_env.as_deref().unwrap_or(STORE_TOKEN_ENV)),
        &format!("{profile_name}/store-token"),
        store.token.as_deref(),
    )
}

fn resolve_secret(env_name: Option<&str>, keyring_user: &str, plaintext: Option<&str>) -> Option<SecretString> {
    // 1. Env var
    if let Some(val) = env_name.and_then(|name| std::env::var(name).ok()) {
        if !val.trim().is_empty() {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, keyring_user) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    plaintext
        .filter(|s| !s.trim().is_empty())
        .map(|s| SecretString::from(s.to_owned()))
}

// ── Translation to runtime config ───────────────────────────────────

/// Parse the profile's API root.
pub fn profile_base_url(profile: &Profile) -> Result<Url, ConfigError> {
    profile.base_url.parse().map_err(|e| ConfigError::Validation {
        field: "base_url".into(),
        reason: format!("invalid URL '{}': {e}", profile.base_url),
    })
}

/// Build a `TrackerConfig` from a profile, no CLI flag overrides.
pub fn profile_to_tracker_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<TrackerConfig, ConfigError> {
    let api_key = resolve_api_key(profile, profile_name)?;
    tracker_config_with_key(profile, api_key, defaults)
}

/// Build a `TrackerConfig` around an API key the caller already has,
/// e.g. one passed on the command line.
pub fn tracker_config_with_key(
    profile: &Profile,
    api_key: SecretString,
    defaults: &Defaults,
) -> Result<TrackerConfig, ConfigError> {
    let base_url = profile_base_url(profile)?;

    let tls = if profile.insecure.unwrap_or(false) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(TrackerConfig {
        base_url,
        api_key,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
    })
}

/// Build a `StoreConfig` from a profile.
///
/// A `kv` backend without URL or token does not fail here: it becomes
/// [`StoreConfig::Unconfigured`] so units still load and the operator
/// gets a persistence warning instead of a hard error.
pub fn profile_to_store_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<StoreConfig, ConfigError> {
    let store = &profile.store;
    match store.backend {
        StoreBackend::Memory => Ok(StoreConfig::Memory),
        StoreBackend::File => Ok(StoreConfig::File(
            store
                .path
                .clone()
                .unwrap_or_else(|| default_store_path(profile_name)),
        )),
        StoreBackend::Kv => {
            let Some(raw_url) = store.url.as_deref().filter(|u| !u.trim().is_empty()) else {
                return Ok(StoreConfig::Unconfigured(format!(
                    "key-value store URL is not set for profile '{profile_name}'"
                )));
            };
            let url: Url = raw_url.parse().map_err(|e| ConfigError::Validation {
                field: "store.url".into(),
                reason: format!("invalid URL '{raw_url}': {e}"),
            })?;
            let Some(token) = resolve_store_token(store, profile_name) else {
                return Ok(StoreConfig::Unconfigured(format!(
                    "key-value store token is not set for profile '{profile_name}'"
                )));
            };
            Ok(StoreConfig::Rest {
                url,
                token,
                timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
            })
        }
    }
}

/// Poll loop tuning from the global defaults.
pub fn defaults_to_dashboard_config(defaults: &Defaults) -> Result<DashboardConfig, ConfigError> {
    if defaults.poll_interval_secs == 0 {
        return Err(ConfigError::Validation {
            field: "defaults.poll_interval_secs".into(),
            reason: "must be at least 1".into(),
        });
    }
    Ok(DashboardConfig {
        poll_interval: Duration::from_secs(defaults.poll_interval_secs),
        catch_up: chrono::Duration::minutes(i64::from(defaults.catch_up_minutes)),
        look_back: chrono::Duration::minutes(i64::from(defaults.look_back_minutes)),
    })
}
