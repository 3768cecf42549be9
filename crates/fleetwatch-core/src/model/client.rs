// ── Client domain type ──

use serde::{Deserialize, Serialize};

use super::ids::ClientId;

/// Customer company that owns units. Persisted as a JSON array, with
/// camelCase keys shared with other readers of the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(default)]
    pub id: ClientId,
    pub company: String,
    #[serde(default)]
    pub contact_person: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}
