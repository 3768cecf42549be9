// ── Ticket book ──
//
// Tickets are created from alarms and carry their own history. The book is
// a plain list, newest ticket first; the dashboard publishes it as a
// snapshot and replaces it wholesale on every change.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::CoreError;
use crate::model::{Alarm, Ticket, TicketHistoryItem, TicketStatus, Unit};

const DEFAULT_CREATE_NOTE: &str = "Ticket created from alarm.";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct TicketBook {
    tickets: Vec<Ticket>,
}

impl TicketBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    pub fn get(&self, id: &str) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Prepend a ticket.
    pub fn insert(&mut self, ticket: Ticket) {
        self.tickets.insert(0, ticket);
    }

    /// Open a ticket for `alarm` and add it to the book.
    pub fn open_from_alarm(
        &mut self,
        alarm: &Alarm,
        unit: Option<&Unit>,
        notes: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Ticket {
        let ticket = ticket_from_alarm(alarm, unit, notes, author, now);
        self.insert(ticket.clone());
        ticket
    }

    /// Change status and/or add a note. Nothing is recorded when the status
    /// is unchanged and the note is blank.
    pub fn update(
        &mut self,
        id: &str,
        status: TicketStatus,
        notes: &str,
        author: &str,
        now: DateTime<Utc>,
    ) -> Result<Ticket, CoreError> {
        let ticket = self
            .tickets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| CoreError::not_found("ticket", id))?;

        let notes = notes.trim();
        if ticket.status == status && notes.is_empty() {
            return Ok(ticket.clone());
        }

        ticket.history.insert(
            0,
            TicketHistoryItem {
                status,
                timestamp: now,
                notes: if notes.is_empty() {
                    format!("Status changed to {status}")
                } else {
                    notes.to_owned()
                },
                author: author.to_owned(),
            },
        );
        ticket.status = status;
        Ok(ticket.clone())
    }
}

/// Build an `Open` ticket for `alarm`. `unit` supplies the device name
/// when the unit is known.
pub fn ticket_from_alarm(
    alarm: &Alarm,
    unit: Option<&Unit>,
    notes: &str,
    author: &str,
    now: DateTime<Utc>,
) -> Ticket {
    let notes = notes.trim();
    Ticket {
        id: format!("TICKET-{}", Uuid::new_v4().simple()),
        alarm_id: alarm.id.clone(),
        device_id: alarm.device_id,
        device_name: unit.map_or_else(
            || format!("Vehicle {}", alarm.device_id),
            |u| u.number.clone(),
        ),
        status: TicketStatus::Open,
        created_at: now,
        summary: alarm.message.clone(),
        history: vec![TicketHistoryItem {
            status: TicketStatus::Open,
            timestamp: now,
            notes: if notes.is_empty() {
                DEFAULT_CREATE_NOTE.to_owned()
            } else {
                notes.to_owned()
            },
            author: author.to_owned(),
        }],
    }
}
