// ── Key-value persistence ──
//
// Overrides and clients live in a key-value store under two fixed keys.
// `KeyValueStore` is the seam: the REST store from `fleetwatch-api` in
// production, `MemoryStore` in tests, `FileStore` for single-operator use.

mod clients;
mod file;
mod memory;
mod overrides;

use async_trait::async_trait;
use serde_json::Value;

use fleetwatch_api::RestKv;

use crate::error::CoreError;

pub use clients::{CLIENTS_KEY, ClientStore};
pub use file::FileStore;
pub use memory::MemoryStore;
pub use overrides::{OVERRIDES_KEY, OverrideStore, OverrideTable};

/// Minimal JSON document store. Implementations report every failure as
/// [`CoreError::PersistenceUnavailable`].
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// `Ok(None)` when the key has never been written.
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError>;

    async fn set(&self, key: &str, value: Value) -> Result<(), CoreError>;
}

#[async_trait]
impl KeyValueStore for RestKv {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        RestKv::get(self, key).await.map_err(CoreError::persistence)
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        RestKv::set(self, key, &value)
            .await
            .map_err(CoreError::persistence)
    }
}

// ── Unconfigured ─────────────────────────────────────────────────

/// Stand-in used when no store is configured. Every call fails, so units
/// still render and the dashboard reports persistence as degraded.
#[derive(Debug, Clone)]
pub struct UnconfiguredStore {
    reason: String,
}

impl UnconfiguredStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    fn error(&self) -> CoreError {
        CoreError::PersistenceUnavailable {
            message: self.reason.clone(),
            remediation: Some(
                "Configure [store] in the config file: backend = \"file\" for local use, or \
                 backend = \"kv\" with url and token (FLEETWATCH_STORE_TOKEN)"
                    .into(),
            ),
        }
    }
}

#[async_trait]
impl KeyValueStore for UnconfiguredStore {
    async fn get(&self, _key: &str) -> Result<Option<Value>, CoreError> {
        Err(self.error())
    }

    async fn set(&self, _key: &str, _value: Value) -> Result<(), CoreError> {
        Err(self.error())
    }
}

/// `MemoryStore` that yields to the scheduler around every call, so
/// concurrent callers interleave between their reads and writes.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct YieldingStore {
    inner: MemoryStore,
}

#[cfg(test)]
#[async_trait]
impl KeyValueStore for YieldingStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, CoreError> {
        tokio::task::yield_now().await;
        let value = self.inner.get(key).await;
        tokio::task::yield_now().await;
        value
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), CoreError> {
        tokio::task::yield_now().await;
        self.inner.set(key, value).await
    }
}
