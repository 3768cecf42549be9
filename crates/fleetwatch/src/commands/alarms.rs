//! Alarms command: query a recent range and print it deduplicated.

use chrono::{Duration, Utc};
use tabled::Tabled;

use fleetwatch_core::{Alarm, AlarmSet, TelemetrySource};

use crate::cli::{AlarmsArgs, GlobalOpts};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct AlarmRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Time")]
    time: String,
    #[tabled(rename = "Unit")]
    unit: String,
    #[tabled(rename = "Type")]
    alarm_type: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&Alarm> for AlarmRow {
    fn from(a: &Alarm) -> Self {
        Self {
            id: a.id.to_string(),
            time: util::format_time(&a.timestamp),
            unit: a.device_id.to_string(),
            alarm_type: a.alarm_type.clone(),
            message: util::or_dash(&a.message),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(resolved: &Resolved, args: AlarmsArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = resolved.tracker_config(global)?.build_client()?;

    let till = Utc::now();
    let from = till - Duration::minutes(i64::from(args.since_minutes));
    let raw = client.fetch_alarms(from, till).await?;
    let fetched = raw.len();

    let set = AlarmSet::new().ingest(raw.into_iter().map(Alarm::from));
    tracing::debug!(fetched, unique = set.len(), "alarms deduplicated");

    let alarms = set.newest_first();
    let out = output::render_list(
        &global.output,
        &alarms,
        |a| AlarmRow::from(*a),
        |a| a.id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
