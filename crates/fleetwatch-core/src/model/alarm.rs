// ── Alarm domain type ──

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::UnitId;

/// Alarm identity: `"{device_id}-{unix_seconds}"`.
///
/// Two alerts from the same device in the same second share an id and the
/// second one is dropped as a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlarmId(String);

impl AlarmId {
    pub fn new(device_id: UnitId, timestamp: DateTime<Utc>) -> Self {
        Self(format!("{device_id}-{}", timestamp.timestamp()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AlarmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AlarmId {
    fn from(raw: &str) -> Self {
        Self(raw.trim().to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// An alert raised by a tracked device, awaiting operator attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub device_id: UnitId,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub alarm_type: String,
    pub message: String,
    pub location: Coordinates,
    /// Upstream alert id, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<String>,
}
