// fleetwatch-core: Live fleet state between fleetwatch-api and consumers (CLI/UI).

pub mod alarms;
pub mod clock;
pub mod config;
pub mod convert;
pub mod dashboard;
pub mod error;
pub mod merge;
pub mod model;
pub mod source;
pub mod store;
pub mod stream;
pub mod ticket;
pub mod window;

// ── Primary re-exports ──────────────────────────────────────────────
pub use alarms::AlarmSet;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{DashboardConfig, StoreConfig, TlsVerification, TrackerConfig};
pub use dashboard::{Dashboard, PollOutcome, SyncState, TickReport};
pub use error::CoreError;
pub use merge::{apply_override, merge_unit, merge_units};
pub use source::TelemetrySource;
pub use store::{
    ClientStore, FileStore, KeyValueStore, MemoryStore, OverrideStore, OverrideTable, UnconfiguredStore,
};
pub use stream::{SnapshotStream, Subscription};
pub use ticket::{TicketBook, ticket_from_alarm};
pub use window::{AlarmWindow, Window, WindowPhase};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alarm, AlarmId, Client, ClientId, Coordinates, Location, Telemetry, Ticket,
    TicketHistoryItem, TicketStatus, Unit, UnitId, UnitOverride,
};
