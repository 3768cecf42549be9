// Tracking API record types
//
// `UnitRaw` mirrors the upstream unit object closely; fields use
// `#[serde(default)]` liberally because the API omits blocks that were not
// requested via `include=` or that the hardware does not report.
// `AlarmRaw` is already normalized: the two upstream alert list shapes and
// the datetime formats are resolved before a caller sees it.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Units ────────────────────────────────────────────────────────────

/// One device record from `unit/list.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitRaw {
    pub unit_id: u64,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub vehicle_title: Option<String>,
    /// Last position report, as sent by upstream.
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub ignition: Option<IgnitionInfo>,
    #[serde(default)]
    pub drivers: Option<Vec<DriverInfo>>,

    // Raw telemetry blocks, passed through untouched.
    #[serde(default)]
    pub fuel: Option<serde_json::Value>,
    #[serde(default)]
    pub can: Option<serde_json::Value>,
    #[serde(default)]
    pub relays: Option<serde_json::Value>,
    #[serde(default)]
    pub io_din: Option<serde_json::Value>,
    #[serde(default)]
    pub supply_voltage: Option<serde_json::Value>,
}

impl UnitRaw {
    /// Bare record with only an id, every optional block empty.
    pub fn new(unit_id: u64) -> Self {
        Self {
            unit_id,
            number: None,
            label: None,
            vehicle_title: None,
            last_update: None,
            lat: None,
            lng: None,
            speed: None,
            ignition: None,
            drivers: None,
            fuel: None,
            can: None,
            relays: None,
            io_din: None,
            supply_voltage: None,
        }
    }

    /// Name of the first reported driver, if it is non-blank.
    pub fn driver_name(&self) -> Option<&str> {
        self.drivers
            .as_ref()?
            .first()?
            .name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }

    /// Ignition is on only when upstream reports state `1`.
    pub fn ignition_on(&self) -> bool {
        self.ignition.as_ref().and_then(|i| i.state) == Some(1)
    }
}

/// `ignition` block: `{ "state": 0 | 1, ... }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnitionInfo {
    #[serde(default)]
    pub state: Option<i64>,
}

/// One entry of the `drivers` block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriverInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// Upstream sends either a number or a string here.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

// ── Alarms ───────────────────────────────────────────────────────────

/// One alert from `alert/list.json`, normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlarmRaw {
    /// Upstream alert id when reported. Informational only.
    pub alert_id: Option<String>,
    pub unit_id: u64,
    pub timestamp: DateTime<Utc>,
    pub type_name: Option<String>,
    pub msg: Option<String>,
    pub address: Option<String>,
    pub lat: f64,
    pub lng: f64,
}

/// Wire form of an alert, before datetime parsing.
#[derive(Debug, Deserialize)]
pub(crate) struct AlertRecord {
    #[serde(default)]
    pub alert_id: Option<serde_json::Value>,
    pub unit_id: u64,
    pub datetime: String,
    #[serde(default, alias = "alert_type")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

// ── Datetimes ────────────────────────────────────────────────────────

/// Parse an upstream datetime: RFC 3339, or `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn parse_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a query bound the way the alert endpoint expects it.
pub(crate) fn format_query_datetime(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}
