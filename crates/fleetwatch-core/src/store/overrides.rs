// ── Override store ──
//
// Persisted as an association list, `[[unit_id, override], ...]`, which is
// what other readers of the same key expect. Inside the crate the table is
// a `BTreeMap`; the list form exists only in `decode`/`encode`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::error::CoreError;
use crate::model::{UnitId, UnitOverride};

pub const OVERRIDES_KEY: &str = "gps_app_unit_overrides";

pub type OverrideTable = BTreeMap<UnitId, UnitOverride>;

/// Clones share one write lock, so saves through any clone are applied one
/// after another.
#[derive(Clone)]
pub struct OverrideStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl OverrideStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Every stored override. A key that was never written is an empty
    /// table.
    pub async fn load(&self) -> Result<OverrideTable, CoreError> {
        match self.kv.get(OVERRIDES_KEY).await? {
            None | Some(Value::Null) => Ok(OverrideTable::new()),
            Some(value) => decode(value),
        }
    }

    /// Merge `edit` over the stored override for `unit_id` and write the
    /// table back. Blank fields in the edit are ignored; an edit with no
    /// fields at all is rejected.
    pub async fn save(&self, unit_id: UnitId, edit: UnitOverride) -> Result<UnitOverride, CoreError> {
        let edit = edit.sanitized();
        if edit.is_empty() {
            return Err(CoreError::validation(format!(
                "override for unit {unit_id} sets no fields"
            )));
        }

        let _guard = self.write_lock.lock().await;
        let mut table = self.load().await?;
        let merged = table
            .get(&unit_id)
            .map_or_else(|| edit.clone(), |stored| stored.merged_with(&edit));
        table.insert(unit_id, merged.clone());

        self.kv.set(OVERRIDES_KEY, encode(&table)?).await?;
        debug!(%unit_id, overrides = table.len(), "override saved");
        Ok(merged)
    }
}

fn decode(value: Value) -> Result<OverrideTable, CoreError> {
    let pairs: Vec<(UnitId, UnitOverride)> =
        serde_json::from_value(value).map_err(|e| CoreError::PersistenceUnavailable {
            message: format!("stored overrides under `{OVERRIDES_KEY}` are unreadable: {e}"),
            remediation: None,
        })?;
    // Later entries win, as they would in a map built from the list.
    Ok(pairs.into_iter().collect())
}

fn encode(table: &OverrideTable) -> Result<Value, CoreError> {
    let pairs: Vec<(&UnitId, &UnitOverride)> = table.iter().collect();
    serde_json::to_value(pairs).map_err(|e| CoreError::Internal(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::model::ClientId;
    use crate::store::{MemoryStore, UnconfiguredStore, YieldingStore};

    fn store_with(value: Value) -> (Arc<MemoryStore>, OverrideStore) {
        let kv = Arc::new(MemoryStore::with_entries([(OVERRIDES_KEY, value)]));
        (kv.clone(), OverrideStore::new(kv))
    }

    #[tokio::test]
    async fn association_list_becomes_table() {
        let (_, store) = store_with(json!([[7, { "driver": "X" }], [9, { "clientId": 3 }]]));
        let table = store.load().await.unwrap();

        assert_eq!(table[&UnitId(7)].driver.as_deref(), Some("X"));
        assert_eq!(table[&UnitId(9)].client_id, Some(ClientId(3)));
    }

    #[tokio::test]
    async fn save_merges_and_writes_association_list() {
        let (kv, store) = store_with(json!([[7, { "number": "LV-1", "driver": "Old" }]]));

        let saved = store
            .save(
                UnitId(7),
                UnitOverride {
                    driver: Some("New".into()),
                    model: Some(String::new()),
                    ..UnitOverride::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(saved.number.as_deref(), Some("LV-1"));
        assert_eq!(saved.driver.as_deref(), Some("New"));
        assert_eq!(saved.model, None);

        let raw = kv.get(OVERRIDES_KEY).await.unwrap().unwrap();
        assert_eq!(
            raw,
            json!([[7, { "number": "LV-1", "driver": "New", "isMock": false }]])
        );
    }

    #[tokio::test]
    async fn concurrent_saves_keep_both_units() {
        let store = OverrideStore::new(Arc::new(YieldingStore::default()));
        let other = store.clone();
        let edit = |driver: &str| UnitOverride {
            driver: Some(driver.into()),
            ..UnitOverride::default()
        };

        let (a, b) = tokio::join!(
            store.save(UnitId(1), edit("A")),
            other.save(UnitId(2), edit("B")),
        );
        a.unwrap();
        b.unwrap();

        let table = store.load().await.unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table[&UnitId(1)].driver.as_deref(), Some("A"));
        assert_eq!(table[&UnitId(2)].driver.as_deref(), Some("B"));
    }

    #[tokio::test]
    async fn empty_edit_is_rejected() {
        let (_, store) = store_with(json!([]));
        let err = store
            .save(
                UnitId(1),
                UnitOverride {
                    driver: Some("   ".into()),
                    ..UnitOverride::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn missing_key_is_empty() {
        let store = OverrideStore::new(Arc::new(MemoryStore::new()));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn garbage_is_a_persistence_error() {
        let (_, store) = store_with(json!({ "7": "nope" }));
        assert!(store.load().await.unwrap_err().is_persistence());
    }

    #[tokio::test]
    async fn unconfigured_store_carries_remediation() {
        let store = OverrideStore::new(Arc::new(UnconfiguredStore::new("no store configured")));
        let err = store.load().await.unwrap_err();
        assert!(err.is_persistence());
        assert!(err.remediation().is_some());
    }
}
