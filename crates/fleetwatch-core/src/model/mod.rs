// ── Fleet domain model ──
//
// Canonical representations of everything the dashboard publishes. Raw
// tracking API records are converted into these in `crate::convert` and
// `crate::merge`; consumers (CLI/UI) depend only on this module.

pub mod alarm;
pub mod client;
pub mod ids;
pub mod ticket;
pub mod unit;
pub mod unit_override;

// ── Re-exports ──────────────────────────────────────────────────────

pub use alarm::{Alarm, AlarmId, Coordinates};
pub use client::Client;
pub use ids::{ClientId, UnitId};
pub use ticket::{Ticket, TicketHistoryItem, TicketStatus};
pub use unit::{Location, Telemetry, Unit};
pub use unit_override::UnitOverride;
