// Tracking API unit endpoint

use tracing::debug;

use crate::error::Error;
use crate::tracker::client::TrackerClient;
use crate::tracker::models::UnitRaw;
use crate::tracker::normalize;

/// Telemetry blocks requested alongside every unit.
const UNIT_INCLUDES: &str = "can,fuel,drivers,supply_voltage,relays,ignition,io_din";

impl TrackerClient {
    /// List the current state of every unit visible to the API key.
    ///
    /// `GET {base}/unit/list.json?include=...`
    pub async fn list_units(&self) -> Result<Vec<UnitRaw>, Error> {
        let url = self.endpoint_url("unit/list.json", &[("include", UNIT_INCLUDES)])?;
        let body = self.get_json(url).await?;
        let units = normalize::units(&body)?;
        debug!(count = units.len(), "listed units");
        Ok(units)
    }
}
