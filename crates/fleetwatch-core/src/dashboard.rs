// ── Dashboard ──
//
// Owns the published fleet state and the background poll loop. Each tick
// runs the units path (fetch ‖ overrides ‖ clients → merge) and the alarms
// path (window → fetch → dedup) concurrently; a failure in one never holds
// back the other. Operator actions (dismiss, tickets, overrides, clients)
// go through here too so every change lands in the published snapshots.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::alarms::AlarmSet;
use crate::clock::{Clock, SystemClock};
use crate::config::DashboardConfig;
use crate::error::CoreError;
use crate::merge::{apply_override, merge_units};
use crate::model::{Alarm, AlarmId, Client, ClientId, Ticket, TicketStatus, Unit, UnitId, UnitOverride};
use crate::source::TelemetrySource;
use crate::store::{ClientStore, KeyValueStore, OverrideStore, OverrideTable};
use crate::stream::Subscription;
use crate::ticket::TicketBook;
use crate::window::{AlarmWindow, Window};

// ── SyncState ────────────────────────────────────────────────────

/// How fresh the published unit data is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SyncState {
    /// No units result yet.
    Loading,
    /// Unit data has been published at least once.
    Live,
    /// The tracking API failed before any unit data arrived.
    Unreachable,
}

// ── Poll outcome ─────────────────────────────────────────────────

/// What one tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Units published, `None` when the units path failed.
    pub units: Option<usize>,
    /// Alarms added to the set, `None` when the alarms path failed.
    pub new_alarms: Option<usize>,
    /// Per-path error messages, units first.
    pub errors: Vec<String>,
}

impl TickReport {
    /// Errors joined the way they are published.
    pub fn error(&self) -> Option<String> {
        if self.errors.is_empty() {
            None
        } else {
            Some(self.errors.join("; "))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    Completed(TickReport),
    /// Another tick was still in flight.
    Skipped,
    /// The dashboard was shut down before or during the tick.
    Cancelled,
}

// ── Dashboard ────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<DashboardInner>`. Nothing is fetched until
/// [`start()`](Self::start) or [`refresh()`](Self::refresh) is called.
#[derive(Clone)]
pub struct Dashboard {
    inner: Arc<DashboardInner>,
}

struct DashboardInner {
    config: DashboardConfig,
    source: Arc<dyn TelemetrySource>,
    overrides: OverrideStore,
    client_store: ClientStore,
    clock: Arc<dyn Clock>,

    // Published state
    units: watch::Sender<Arc<Vec<Unit>>>,
    clients: watch::Sender<Arc<Vec<Client>>>,
    alarms: watch::Sender<Arc<AlarmSet>>,
    tickets: watch::Sender<Arc<TicketBook>>,
    error: watch::Sender<Option<String>>,
    sync_state: watch::Sender<SyncState>,
    persistence_degraded: watch::Sender<bool>,
    muted: watch::Sender<bool>,
    last_poll: watch::Sender<Option<DateTime<Utc>>>,

    /// Held for the duration of a tick; `try_lock` failing means busy.
    tick: Mutex<TickState>,
    cancel: CancellationToken,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

struct TickState {
    window: AlarmWindow,
}

/// Units path result before publication.
struct UnitsFetch {
    units: Vec<Unit>,
    /// Fresh client list, `None` when it could not be read.
    clients: Option<Vec<Client>>,
    persistence_error: Option<CoreError>,
}

impl Dashboard {
    /// Create a dashboard on the wall clock.
    pub fn new(
        config: DashboardConfig,
        source: Arc<dyn TelemetrySource>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        Self::with_clock(config, source, store, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: DashboardConfig,
        source: Arc<dyn TelemetrySource>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let window = AlarmWindow::with_spans(clock.now(), config.catch_up, config.look_back);

        Self {
            inner: Arc::new(DashboardInner {
                config,
                source,
                overrides: OverrideStore::new(store.clone()),
                client_store: ClientStore::new(store),
                clock,
                units: watch::Sender::new(Arc::new(Vec::new())),
                clients: watch::Sender::new(Arc::new(Vec::new())),
                alarms: watch::Sender::new(Arc::new(AlarmSet::new())),
                tickets: watch::Sender::new(Arc::new(TicketBook::new())),
                error: watch::Sender::new(None),
                sync_state: watch::Sender::new(SyncState::Loading),
                persistence_degraded: watch::Sender::new(false),
                muted: watch::Sender::new(false),
                last_poll: watch::Sender::new(None),
                tick: Mutex::new(TickState { window }),
                cancel: CancellationToken::new(),
                task_handle: Mutex::new(None),
            }),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the poll loop: one tick right away, then one every
    /// `poll_interval`. Calling it again while running does nothing.
    pub async fn start(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::Shutdown);
        }

        let mut handle = self.inner.task_handle.lock().await;
        if handle.is_some() {
            return Ok(());
        }

        let period = self.inner.config.poll_interval;
        *handle = Some(tokio::spawn(poll_task(
            self.clone(),
            period,
            self.inner.cancel.clone(),
        )));
        info!(interval = ?period, "dashboard started");
        Ok(())
    }

    /// Stop the poll loop and wait for it to finish. In-flight fetches are
    /// abandoned and nothing is published afterwards.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();

        let handle = self.inner.task_handle.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "poll task ended abnormally");
            }
        }
        info!("dashboard stopped");
    }

    pub fn is_shut_down(&self) -> bool {
        self.inner.cancel.is_cancelled()
    }

    /// Poll right now, outside the timer. Skipped if a tick is running.
    pub async fn refresh(&self) -> PollOutcome {
        self.poll_once().await
    }

    // ── Tick ─────────────────────────────────────────────────────

    async fn poll_once(&self) -> PollOutcome {
        let inner = &self.inner;
        if inner.cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }
        let Ok(mut tick) = inner.tick.try_lock() else {
            debug!("tick already in flight, skipping");
            return PollOutcome::Skipped;
        };

        let now = inner.clock.now();
        let window = tick.window.next_window(now);

        let work = async { tokio::join!(self.fetch_units(), self.fetch_alarms(window)) };
        let (units_res, alarms_res) = tokio::select! {
            biased;
            () = inner.cancel.cancelled() => return PollOutcome::Cancelled,
            results = work => results,
        };
        if inner.cancel.is_cancelled() {
            return PollOutcome::Cancelled;
        }

        let mut report = TickReport::default();

        match units_res {
            Ok(fetch) => {
                report.units = Some(fetch.units.len());
                inner.units.send_replace(Arc::new(fetch.units));
                if let Some(clients) = fetch.clients {
                    inner.clients.send_replace(Arc::new(clients));
                }
                inner
                    .persistence_degraded
                    .send_replace(fetch.persistence_error.is_some());
                if let Some(e) = fetch.persistence_error {
                    warn!(error = %e, "store unavailable, units published without overrides");
                    report.errors.push(e.to_string());
                }
                inner.sync_state.send_replace(SyncState::Live);
            }
            Err(e) => {
                warn!(error = %e, "units fetch failed");
                report.errors.push(e.to_string());
                inner.sync_state.send_if_modified(|state| {
                    let first_load = *state == SyncState::Loading;
                    if first_load {
                        *state = SyncState::Unreachable;
                    }
                    first_load
                });
            }
        }

        match alarms_res {
            Ok(batch) => {
                tick.window = tick.window.advance(window.till);
                let cutoff = tick.window.lower_bound();
                let mut added = 0;
                inner.alarms.send_modify(|set| {
                    let next = set.ingest(batch).prune_dismissed(cutoff);
                    added = next.len().saturating_sub(set.len());
                    *set = Arc::new(next);
                });
                report.new_alarms = Some(added);
            }
            Err(e) => {
                warn!(error = %e, "alarms fetch failed");
                report.errors.push(e.to_string());
            }
        }

        inner.error.send_replace(report.error());
        inner.last_poll.send_replace(Some(now));
        debug!(
            units = ?report.units,
            new_alarms = ?report.new_alarms,
            errors = report.errors.len(),
            "tick complete"
        );
        PollOutcome::Completed(report)
    }

    async fn fetch_units(&self) -> Result<UnitsFetch, CoreError> {
        let inner = &self.inner;
        let (raw, overrides, clients) = tokio::join!(
            inner.source.fetch_units(),
            inner.overrides.load(),
            inner.client_store.list(),
        );
        let raw = raw?;

        let mut persistence_error = None;
        let overrides = overrides.unwrap_or_else(|e| {
            persistence_error = Some(e);
            OverrideTable::new()
        });
        let clients = match clients {
            Ok(clients) => Some(clients),
            Err(e) => {
                persistence_error.get_or_insert(e);
                None
            }
        };

        // Without a fresh list the last published one keeps owners stable.
        let units = match &clients {
            Some(clients) => merge_units(&raw, clients, &overrides),
            None => {
                let last = inner.clients.borrow().clone();
                merge_units(&raw, &last, &overrides)
            }
        };

        Ok(UnitsFetch {
            units,
            clients,
            persistence_error,
        })
    }

    async fn fetch_alarms(&self, window: Window) -> Result<Vec<Alarm>, CoreError> {
        let raw = self
            .inner
            .source
            .fetch_alarms(window.from, window.till)
            .await?;
        Ok(raw.into_iter().map(Alarm::from).collect())
    }

    // ── Alarm operations ─────────────────────────────────────────

    /// Remove an alarm from the active set. Returns `false` when it was
    /// not there.
    pub fn dismiss_alarm(&self, id: &AlarmId) -> bool {
        if self.is_shut_down() {
            return false;
        }
        self.inner.alarms.send_if_modified(|set| {
            if !set.contains(id) {
                return false;
            }
            *set = Arc::new(set.dismiss(id));
            true
        })
    }

    /// Open a ticket for an active alarm and dismiss the alarm.
    pub fn create_ticket_from_alarm(
        &self,
        alarm_id: &AlarmId,
        notes: &str,
        author: &str,
    ) -> Result<Ticket, CoreError> {
        self.ensure_running()?;

        let alarm = self
            .inner
            .alarms
            .borrow()
            .get(alarm_id)
            .cloned()
            .ok_or_else(|| CoreError::not_found("alarm", alarm_id))?;
        let unit = self
            .inner
            .units
            .borrow()
            .iter()
            .find(|u| u.unit_id == alarm.device_id)
            .cloned();

        let now = self.inner.clock.now();
        let mut ticket = None;
        self.inner.tickets.send_modify(|book| {
            let book = Arc::make_mut(book);
            ticket = Some(book.open_from_alarm(&alarm, unit.as_ref(), notes, author, now));
        });
        let ticket = ticket.ok_or_else(|| CoreError::Internal("ticket was not recorded".into()))?;
        self.dismiss_alarm(alarm_id);

        info!(ticket = %ticket.id, alarm = %alarm_id, "ticket opened");
        Ok(ticket)
    }

    /// Change a ticket's status and/or add a note.
    pub fn update_ticket(
        &self,
        ticket_id: &str,
        status: TicketStatus,
        notes: &str,
        author: &str,
    ) -> Result<Ticket, CoreError> {
        self.ensure_running()?;

        let now = self.inner.clock.now();
        let mut result = Err(CoreError::not_found("ticket", ticket_id));
        self.inner.tickets.send_if_modified(|book| {
            if book.get(ticket_id).is_none() {
                return false;
            }
            result = Arc::make_mut(book).update(ticket_id, status, notes, author, now);
            result.is_ok()
        });
        result
    }

    // ── Override and client operations ───────────────────────────

    /// Persist an override edit and apply it to the published unit right
    /// away. A client id must name an existing client.
    pub async fn save_override(
        &self,
        unit_id: UnitId,
        edit: UnitOverride,
    ) -> Result<UnitOverride, CoreError> {
        self.ensure_running()?;

        if let Some(client_id) = edit.client_id.filter(|id| !id.is_unassigned()) {
            self.inner.client_store.ensure_exists(client_id).await?;
        }

        let saved = self.inner.overrides.save(unit_id, edit).await?;

        self.inner.units.send_if_modified(|units| {
            let Some(pos) = units.iter().position(|u| u.unit_id == unit_id) else {
                return false;
            };
            let units = Arc::make_mut(units);
            if let Some(unit) = units.get_mut(pos) {
                *unit = apply_override(unit.clone(), &saved);
            }
            true
        });

        info!(%unit_id, "override saved");
        Ok(saved)
    }

    /// Every stored override, read straight from the store.
    pub async fn overrides(&self) -> Result<OverrideTable, CoreError> {
        self.inner.overrides.load().await
    }

    /// Insert or update a client and republish the list.
    pub async fn save_client(&self, client: Client) -> Result<Client, CoreError> {
        self.ensure_running()?;
        let saved = self.inner.client_store.save(client).await?;
        self.reload_clients().await?;
        info!(client_id = %saved.id, "client saved");
        Ok(saved)
    }

    pub async fn delete_client(&self, id: ClientId) -> Result<(), CoreError> {
        self.ensure_running()?;
        self.inner.client_store.delete(id).await?;
        self.reload_clients().await?;
        info!(client_id = %id, "client deleted");
        Ok(())
    }

    async fn reload_clients(&self) -> Result<(), CoreError> {
        let clients = self.inner.client_store.list().await?;
        self.inner.clients.send_replace(Arc::new(clients));
        Ok(())
    }

    // ── Mute ─────────────────────────────────────────────────────

    /// Silence alarm notifications in the UI. Alarms keep accumulating.
    pub fn set_muted(&self, muted: bool) {
        self.inner.muted.send_replace(muted);
    }

    pub fn muted(&self) -> bool {
        *self.inner.muted.borrow()
    }

    // ── State observation ────────────────────────────────────────

    pub fn sync_state(&self) -> SyncState {
        *self.inner.sync_state.borrow()
    }

    pub fn sync_state_updates(&self) -> watch::Receiver<SyncState> {
        self.inner.sync_state.subscribe()
    }

    /// Last tick's errors, joined with `"; "`. `None` after a clean tick.
    pub fn error(&self) -> Option<String> {
        self.inner.error.borrow().clone()
    }

    pub fn error_updates(&self) -> watch::Receiver<Option<String>> {
        self.inner.error.subscribe()
    }

    /// `true` while the override/client store is failing.
    pub fn persistence_degraded(&self) -> bool {
        *self.inner.persistence_degraded.borrow()
    }

    pub fn last_poll(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_poll.borrow()
    }

    // ── Snapshot accessors ───────────────────────────────────────

    pub fn units_snapshot(&self) -> Arc<Vec<Unit>> {
        self.inner.units.borrow().clone()
    }

    pub fn clients_snapshot(&self) -> Arc<Vec<Client>> {
        self.inner.clients.borrow().clone()
    }

    pub fn alarms_snapshot(&self) -> Arc<AlarmSet> {
        self.inner.alarms.borrow().clone()
    }

    pub fn tickets_snapshot(&self) -> Arc<TicketBook> {
        self.inner.tickets.borrow().clone()
    }

    // ── Subscriptions ────────────────────────────────────────────

    pub fn units(&self) -> Subscription<Vec<Unit>> {
        Subscription::new(self.inner.units.subscribe())
    }

    pub fn clients(&self) -> Subscription<Vec<Client>> {
        Subscription::new(self.inner.clients.subscribe())
    }

    pub fn alarms(&self) -> Subscription<AlarmSet> {
        Subscription::new(self.inner.alarms.subscribe())
    }

    pub fn tickets(&self) -> Subscription<TicketBook> {
        Subscription::new(self.inner.tickets.subscribe())
    }

    // ── Helpers ──────────────────────────────────────────────────

    fn ensure_running(&self) -> Result<(), CoreError> {
        if self.is_shut_down() {
            Err(CoreError::Shutdown)
        } else {
            Ok(())
        }
    }
}

// ── Background task ──────────────────────────────────────────────

/// Tick on a fixed interval until cancelled. The first tick fires
/// immediately.
async fn poll_task(dashboard: Dashboard, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                match dashboard.poll_once().await {
                    PollOutcome::Completed(report) => {
                        if let Some(error) = report.error() {
                            warn!(%error, "poll tick finished with errors");
                        }
                    }
                    PollOutcome::Skipped => debug!("previous tick still running"),
                    PollOutcome::Cancelled => break,
                }
            }
        }
    }
}
