//! Shared helpers for command handlers.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use fleetwatch_core::{Client, ClientId, Dashboard};

use crate::cli::GlobalOpts;
use crate::config::{self, Resolved};
use crate::error::CliError;

/// Build a dashboard over the profile's tracking API and store.
pub fn build_dashboard(
    resolved: &Resolved,
    global: &GlobalOpts,
    interval: Option<u64>,
) -> Result<Dashboard, CliError> {
    let tracker = resolved.tracker_config(global)?;
    if config::is_insecure(&tracker) {
        warn(global, "TLS certificate verification is disabled");
    }
    let source = tracker.build_client()?;
    let store = resolved.store()?;
    let dashboard_config = resolved.dashboard_config(interval)?;
    Ok(Dashboard::new(dashboard_config, Arc::new(source), store))
}

/// Print a warning to stderr unless `--quiet`.
pub fn warn(global: &GlobalOpts, message: &str) {
    if !global.quiet {
        eprintln!("warning: {message}");
    }
}

/// Company name for a client id, or a dash.
pub fn client_name(clients: &[Client], id: Option<ClientId>) -> String {
    id.and_then(|id| clients.iter().find(|c| c.id == id))
        .map_or_else(|| "-".into(), |c| c.company.clone())
}

pub fn format_time(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// `"-"` for blank values in table cells.
pub fn or_dash(value: &str) -> String {
    if value.trim().is_empty() {
        "-".into()
    } else {
        value.to_owned()
    }
}
