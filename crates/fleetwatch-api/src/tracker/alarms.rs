// Tracking API alert endpoint

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::Error;
use crate::tracker::client::TrackerClient;
use crate::tracker::models::{AlarmRaw, format_query_datetime};
use crate::tracker::normalize;

impl TrackerClient {
    /// List alerts raised in `[from, till)`.
    ///
    /// `GET {base}/alert/list.json?from=...&till=...&include=address`
    ///
    /// Rejects `from > till` without touching the network.
    pub async fn list_alarms(
        &self,
        from: DateTime<Utc>,
        till: DateTime<Utc>,
    ) -> Result<Vec<AlarmRaw>, Error> {
        if from > till {
            return Err(Error::InvalidWindow { from, till });
        }

        let from_q = format_query_datetime(&from);
        let till_q = format_query_datetime(&till);
        let url = self.endpoint_url(
            "alert/list.json",
            &[("from", &from_q), ("till", &till_q), ("include", "address")],
        )?;

        let body = self.get_json(url).await?;
        let alarms = normalize::alerts(&body)?;
        debug!(from = %from_q, till = %till_q, count = alarms.len(), "listed alarms");
        Ok(alarms)
    }
}
