// ── Operator overrides ──
//
// Persisted per unit under the overrides key. Every field is optional and
// absent fields are never written, so a stored override only ever carries
// what an operator actually typed.

use serde::{Deserialize, Serialize};

use super::ids::ClientId;

/// User-editable fields for one unit. Also used as the edit payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver_phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<ClientId>,
    /// Always `Some(false)` once saved: an edited unit is no longer demo
    /// data. Not an editable field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_mock: Option<bool>,
}

impl UnitOverride {
    /// `true` when no editable field is set.
    pub fn is_empty(&self) -> bool {
        self.number.is_none()
            && self.model.is_none()
            && self.driver.is_none()
            && self.driver_phone.is_none()
            && self.client_id.is_none()
    }

    /// Trim text fields and drop blank ones; client `0` counts as absent.
    /// The result is marked as not mock.
    pub fn sanitized(self) -> Self {
        Self {
            number: non_blank(self.number),
            model: non_blank(self.model),
            driver: non_blank(self.driver),
            driver_phone: non_blank(self.driver_phone),
            client_id: self.client_id.filter(|id| !id.is_unassigned()),
            is_mock: Some(false),
        }
    }

    /// Lay `edit` over `self`: fields present in the edit win, the rest
    /// are kept.
    pub fn merged_with(&self, edit: &UnitOverride) -> UnitOverride {
        UnitOverride {
            number: edit.number.clone().or_else(|| self.number.clone()),
            model: edit.model.clone().or_else(|| self.model.clone()),
            driver: edit.driver.clone().or_else(|| self.driver.clone()),
            driver_phone: edit
                .driver_phone
                .clone()
                .or_else(|| self.driver_phone.clone()),
            client_id: edit.client_id.or(self.client_id),
            is_mock: Some(false),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}
