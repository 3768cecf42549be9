//! Watch command: run the poll loop and print what changes.

use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use fleetwatch_core::{Alarm, AlarmId, AlarmSet, Unit};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::config::Resolved;
use crate::error::CliError;
use crate::output;

use super::util;

/// One line of structured watch output.
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum WatchEvent<'a> {
    Units {
        total: usize,
        moving: usize,
        ignition_on: usize,
    },
    Alarm(&'a Alarm),
    Error {
        message: &'a str,
    },
}

struct Printer {
    structured: bool,
    color: bool,
    quiet: bool,
}

impl Printer {
    fn new(global: &GlobalOpts) -> Self {
        Self {
            structured: !matches!(global.output, OutputFormat::Table | OutputFormat::Plain),
            color: output::should_color(&global.color),
            quiet: global.quiet,
        }
    }

    fn units(&self, units: &[Unit]) {
        let event = WatchEvent::Units {
            total: units.len(),
            moving: units.iter().filter(|u| u.speed > 0.0).count(),
            ignition_on: units.iter().filter(|u| u.ignition).count(),
        };
        if self.structured {
            self.json(&event);
        } else if let WatchEvent::Units {
            total,
            moving,
            ignition_on,
        } = event
        {
            let line = format!("{total} units, {moving} moving, {ignition_on} with ignition on");
            self.line(&output::muted(&line, self.color));
        }
    }

    fn alarm(&self, alarm: &Alarm) {
        if self.structured {
            self.json(&WatchEvent::Alarm(alarm));
            return;
        }
        let head = format!(
            "{}  unit {}  {}",
            util::format_time(&alarm.timestamp),
            alarm.device_id,
            alarm.alarm_type
        );
        self.line(&format!("{}  {}", output::alert(&head, self.color), alarm.message));
    }

    fn error(&self, message: &str) {
        if self.structured {
            self.json(&WatchEvent::Error { message });
        } else if !self.quiet {
            eprintln!("warning: {message}");
        }
    }

    fn json(&self, event: &WatchEvent<'_>) {
        if let Ok(line) = serde_json::to_string(event) {
            self.line(&line);
        }
    }

    fn line(&self, text: &str) {
        if self.quiet {
            return;
        }
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{text}");
    }
}

/// Alarms in `set` not printed yet, oldest first.
fn unseen<'a>(set: &'a AlarmSet, seen: &mut HashSet<AlarmId>) -> Vec<&'a Alarm> {
    let mut fresh: Vec<&Alarm> = set.iter().filter(|a| seen.insert(a.id.clone())).collect();
    fresh.sort_by_key(|a| a.timestamp);
    fresh
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(resolved: &Resolved, args: WatchArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let dashboard = util::build_dashboard(resolved, global, args.interval)?;
    let printer = Printer::new(global);

    let mut units = dashboard.units();
    let mut alarms = dashboard.alarms();
    let mut errors = dashboard.error_updates();
    let mut seen = HashSet::new();

    dashboard.start().await?;
    tracing::info!(profile = %resolved.profile_name, "watching, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            Some(snapshot) = units.changed() => printer.units(&snapshot),
            Some(snapshot) = alarms.changed() => {
                for alarm in unseen(&snapshot, &mut seen) {
                    printer.alarm(alarm);
                }
            }
            Ok(()) = errors.changed() => {
                let message = errors.borrow_and_update().clone();
                if let Some(message) = message {
                    printer.error(&message);
                }
            }
        }
    }

    dashboard.shutdown().await;
    Ok(())
}
