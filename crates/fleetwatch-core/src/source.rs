// ── Telemetry source seam ──
//
// The dashboard fetches through this trait so tests can substitute a
// scripted source for the HTTP client.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fleetwatch_api::{AlarmRaw, TrackerClient, UnitRaw};

use crate::error::CoreError;

#[async_trait]
pub trait TelemetrySource: Send + Sync {
    /// Current state of every unit.
    async fn fetch_units(&self) -> Result<Vec<UnitRaw>, CoreError>;

    /// Alerts raised in `[from, till)`.
    async fn fetch_alarms(
        &self,
        from: DateTime<Utc>,
        till: DateTime<Utc>,
    ) -> Result<Vec<AlarmRaw>, CoreError>;
}

#[async_trait]
impl TelemetrySource for TrackerClient {
    async fn fetch_units(&self) -> Result<Vec<UnitRaw>, CoreError> {
        Ok(self.list_units().await?)
    }

    async fn fetch_alarms(
        &self,
        from: DateTime<Utc>,
        till: DateTime<Utc>,
    ) -> Result<Vec<AlarmRaw>, CoreError> {
        Ok(self.list_alarms(from, till).await?)
    }
}
