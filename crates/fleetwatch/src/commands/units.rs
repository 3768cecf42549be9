//! Units command: one poll, then the merged unit list.

use tabled::Tabled;

use fleetwatch_core::{Client, PollOutcome, Unit};

use crate::cli::GlobalOpts;
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UnitRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Driver")]
    driver: String,
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Ignition")]
    ignition: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Updated")]
    updated: String,
    #[tabled(rename = "Location")]
    location: String,
}

impl UnitRow {
    fn new(unit: &Unit, clients: &[Client]) -> Self {
        let driver = if unit.is_mock {
            format!("{} (no driver)", unit.driver_label())
        } else {
            unit.driver_label().to_owned()
        };
        Self {
            id: unit.unit_id.to_string(),
            number: unit.number.clone(),
            model: unit.model.clone(),
            driver,
            client: util::client_name(clients, unit.client_id),
            ignition: if unit.ignition { "on" } else { "off" }.into(),
            speed: format!("{:.0} km/h", unit.speed),
            updated: util::format_time(&unit.last_update),
            location: unit.location.address.clone(),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(resolved: &Resolved, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = util::build_dashboard(resolved, global, None)?;
    let outcome = dashboard.refresh().await;
    dashboard.shutdown().await;

    let PollOutcome::Completed(report) = outcome else {
        return Err(CliError::Internal {
            message: "poll did not run".into(),
        });
    };

    if report.units.is_none() {
        return Err(CliError::PollFailed {
            message: report.errors.first().cloned().unwrap_or_default(),
        });
    }
    for error in &report.errors {
        util::warn(global, error);
    }
    if dashboard.persistence_degraded() {
        util::warn(global, "overrides and clients were not applied");
    }

    let units = dashboard.units_snapshot();
    let clients = dashboard.clients_snapshot();
    let out = output::render_list(
        &global.output,
        units.as_slice(),
        |u| UnitRow::new(u, &clients),
        |u| u.unit_id.to_string(),
    );
    output::print_output(&out, global.quiet);
    Ok(())
}
