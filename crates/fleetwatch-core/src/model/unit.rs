// ── Unit domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use fleetwatch_api::DriverInfo;

use super::ids::{ClientId, UnitId};

/// A tracked vehicle: live upstream state merged with operator overrides.
///
/// Rebuilt wholesale on every poll; the core never deletes one on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub unit_id: UnitId,
    /// Display number or plate.
    pub number: String,
    pub model: String,
    pub last_update: DateTime<Utc>,
    pub location: Location,
    pub ignition: bool,
    pub speed: f64,

    /// Owning client. `None` only while the client list is empty.
    pub client_id: Option<ClientId>,
    pub driver: Option<String>,
    pub driver_phone: Option<String>,

    /// No real driver was reported upstream and nobody has edited the unit.
    pub is_mock: bool,

    pub telemetry: Telemetry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    pub address: String,
}

/// Raw telemetry blocks, passed through as reported.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relays: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io_din: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supply_voltage: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub drivers: Vec<DriverInfo>,
}

impl Unit {
    /// Driver name for display, or a dash.
    pub fn driver_label(&self) -> &str {
        self.driver.as_deref().unwrap_or("-")
    }
}
