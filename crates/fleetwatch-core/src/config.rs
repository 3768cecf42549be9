// ── Runtime dashboard configuration ──
//
// These types describe *how* to reach the tracking API and the store and
// how often to poll. They carry credentials but never touch disk: the
// CLI builds them from its config file and hands them in.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

use fleetwatch_api::{RestKv, TlsMode, TrackerClient, TransportConfig};

use crate::error::CoreError;
use crate::store::{FileStore, KeyValueStore, MemoryStore, UnconfiguredStore};
use crate::window::{DEFAULT_CATCH_UP, DEFAULT_LOOK_BACK};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification. Only for test deployments.
    DangerAcceptInvalid,
}

/// Connection to the tracking API.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// API root, e.g. `https://mapon.com/api/v1/`.
    pub base_url: Url,
    pub api_key: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TrackerConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: tls_to_transport(&self.tls),
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client for this configuration.
    pub fn build_client(&self) -> Result<TrackerClient, CoreError> {
        Ok(TrackerClient::new(
            self.base_url.clone(),
            self.api_key.clone(),
            &self.transport(),
        )?)
    }
}

/// Where overrides and clients are persisted.
#[derive(Debug, Clone)]
pub enum StoreConfig {
    /// Process-local; lost on exit.
    Memory,
    /// One JSON document on disk.
    File(PathBuf),
    /// REST key-value service.
    Rest {
        url: Url,
        token: SecretString,
        timeout: Duration,
    },
    /// Nothing usable configured; every store call fails with this reason.
    Unconfigured(String),
}

impl StoreConfig {
    /// Build the store. Only the REST backend can fail to build.
    pub fn build(&self) -> Result<Arc<dyn KeyValueStore>, CoreError> {
        Ok(match self {
            Self::Memory => Arc::new(MemoryStore::new()),
            Self::File(path) => Arc::new(FileStore::new(path.clone())),
            Self::Rest {
                url,
                token,
                timeout,
            } => {
                let transport = TransportConfig {
                    timeout: *timeout,
                    ..TransportConfig::default()
                };
                Arc::new(RestKv::new(url.clone(), token, &transport)?)
            }
            Self::Unconfigured(reason) => Arc::new(UnconfiguredStore::new(reason.clone())),
        })
    }
}

/// Poll loop tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    /// Delay between ticks.
    pub poll_interval: Duration,
    /// How far back the first alarm query reaches.
    pub catch_up: chrono::Duration,
    /// Overlap between consecutive alarm queries.
    pub look_back: chrono::Duration,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            catch_up: DEFAULT_CATCH_UP,
            look_back: DEFAULT_LOOK_BACK,
        }
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
