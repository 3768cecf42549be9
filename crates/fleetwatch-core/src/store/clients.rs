// ── Client store ──
//
// The whole client list is one JSON array under a fixed key; every change
// rewrites it.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use super::KeyValueStore;
use crate::error::CoreError;
use crate::model::{Client, ClientId};

pub const CLIENTS_KEY: &str = "gps_app_clients";

/// Clones share one write lock; id assignment and the rewrite happen
/// under it.
#[derive(Clone)]
pub struct ClientStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Arc<Mutex<()>>,
}

impl ClientStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<Client>, CoreError> {
        match self.kv.get(CLIENTS_KEY).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => serde_json::from_value(value).map_err(|e| {
                CoreError::PersistenceUnavailable {
                    message: format!("stored clients under `{CLIENTS_KEY}` are unreadable: {e}"),
                    remediation: None,
                }
            }),
        }
    }

    /// Insert or replace by id. A client with id `0` gets the next free id.
    pub async fn save(&self, client: Client) -> Result<Client, CoreError> {
        let mut client = client;
        client.company = client.company.trim().to_owned();
        if client.company.is_empty() {
            return Err(CoreError::validation("client company must not be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let mut clients = self.list().await?;
        if client.id.is_unassigned() {
            let max = clients.iter().map(|c| c.id.0).max().unwrap_or(0);
            client.id = ClientId(max + 1);
        }

        match clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => existing.clone_from(&client),
            None => clients.push(client.clone()),
        }

        self.write(&clients).await?;
        debug!(client_id = %client.id, "client saved");
        Ok(client)
    }

    pub async fn delete(&self, id: ClientId) -> Result<(), CoreError> {
        let _guard = self.write_lock.lock().await;
        let mut clients = self.list().await?;
        let before = clients.len();
        clients.retain(|c| c.id != id);
        if clients.len() == before {
            return Err(CoreError::not_found("client", id));
        }
        self.write(&clients).await?;
        debug!(client_id = %id, "client deleted");
        Ok(())
    }

    /// Fail with a validation error unless a client with `id` is stored.
    pub async fn ensure_exists(&self, id: ClientId) -> Result<(), CoreError> {
        if self.list().await?.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(CoreError::validation(format!("client {id} does not exist")))
        }
    }

    async fn write(&self, clients: &[Client]) -> Result<(), CoreError> {
        let value = serde_json::to_value(clients).map_err(|e| CoreError::Internal(e.to_string()))?;
        self.kv.set(CLIENTS_KEY, value).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::store::{MemoryStore, YieldingStore};

    fn acme() -> Client {
        Client {
            company: "Acme Logistics".into(),
            contact_person: "Ilze".into(),
            ..Client::default()
        }
    }

    #[tokio::test]
    async fn reads_camel_case_documents() {
        let kv = MemoryStore::with_entries([(
            CLIENTS_KEY,
            json!([{ "id": 101, "company": "Acme", "contactPerson": "Ilze", "phone": "", "email": "" }]),
        )]);
        let clients = ClientStore::new(Arc::new(kv)).list().await.unwrap();
        assert_eq!(clients[0].contact_person, "Ilze");
        assert_eq!(clients[0].id, ClientId(101));
    }

    #[tokio::test]
    async fn new_client_gets_next_id() {
        let store = ClientStore::new(Arc::new(MemoryStore::new()));
        let first = store.save(acme()).await.unwrap();
        let second = store.save(acme()).await.unwrap();

        assert_eq!(first.id, ClientId(1));
        assert_eq!(second.id, ClientId(2));
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_saves_get_distinct_ids() {
        let store = ClientStore::new(Arc::new(YieldingStore::default()));
        let other = store.clone();

        let (a, b) = tokio::join!(store.save(acme()), other.save(acme()));
        let mut ids = vec![a.unwrap().id, b.unwrap().id];
        ids.sort_unstable();

        assert_eq!(ids, [ClientId(1), ClientId(2)]);
        assert_eq!(store.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_with_id_replaces() {
        let store = ClientStore::new(Arc::new(MemoryStore::new()));
        let saved = store.save(acme()).await.unwrap();

        let renamed = Client {
            company: "Acme Baltic".into(),
            ..saved
        };
        store.save(renamed).await.unwrap();

        let clients = store.list().await.unwrap();
        assert_eq!(clients.len(), 1);
        assert_eq!(clients[0].company, "Acme Baltic");
    }

    #[tokio::test]
    async fn blank_company_is_rejected() {
        let store = ClientStore::new(Arc::new(MemoryStore::new()));
        let err = store
            .save(Client {
                company: "  ".into(),
                ..Client::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn delete_unknown_is_not_found() {
        let store = ClientStore::new(Arc::new(MemoryStore::new()));
        store.save(acme()).await.unwrap();

        assert!(matches!(
            store.delete(ClientId(99)).await.unwrap_err(),
            CoreError::NotFound { .. }
        ));
        store.delete(ClientId(1)).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn ensure_exists_rejects_unknown_ids() {
        let store = ClientStore::new(Arc::new(MemoryStore::new()));
        let saved = store.save(acme()).await.unwrap();

        store.ensure_exists(saved.id).await.unwrap();
        assert!(matches!(
            store.ensure_exists(ClientId(7)).await.unwrap_err(),
            CoreError::ValidationFailed { .. }
        ));
    }
}
