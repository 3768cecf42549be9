// ── Ticket domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::alarm::AlarmId;
use super::ids::UnitId;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(ascii_case_insensitive)]
pub enum TicketStatus {
    Open,
    #[serde(rename = "In Progress")]
    #[strum(to_string = "In Progress", serialize = "in-progress", serialize = "in_progress")]
    InProgress,
    Resolved,
    Closed,
}

/// One status change or note on a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketHistoryItem {
    pub status: TicketStatus,
    pub timestamp: DateTime<Utc>,
    pub notes: String,
    pub author: String,
}

/// Follow-up work item created from an alarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub id: String,
    pub alarm_id: AlarmId,
    pub device_id: UnitId,
    pub device_name: String,
    pub status: TicketStatus,
    pub created_at: DateTime<Utc>,
    pub summary: String,
    /// Newest first.
    pub history: Vec<TicketHistoryItem>,
}
