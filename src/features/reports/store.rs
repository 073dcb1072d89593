//! Client-side report collection.
//!
//! Every mutation is synchronous and applied atomically to the watched state,
//! so subscribers always observe a whole operation. The store never performs
//! network I/O; workflows call it after the remote service has answered.

use std::sync::{Arc, Mutex};

use tokio::sync::watch;

use crate::features::reports::models::Report;

/// Reports plus request status, as held by the store
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportCollectionState {
    /// Last-known server order, never re-sorted locally
    pub reports: Vec<Report>,
    /// An outstanding remote operation exists
    pub loading: bool,
    /// Message of the last failed operation
    pub error: Option<String>,
}

impl ReportCollectionState {
    pub fn find(&self, id: &str) -> Option<&Report> {
        self.reports.iter().find(|r| r.id == id)
    }

    pub fn reports_by_owner<'a>(&'a self, uid: &'a str) -> impl Iterator<Item = &'a Report> + 'a {
        self.reports.iter().filter(move |r| r.is_owned_by(uid))
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    fn settle(&mut self) {
        self.loading = false;
        self.error = None;
    }
}

/// Position of a full-list request in the store's mutation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn sequence(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Default)]
struct SequenceClock {
    /// Last number handed out, to tickets or to local mutations
    issued: u64,
    /// Stamp of the newest collection change applied
    applied: u64,
}

impl SequenceClock {
    fn stamp_local(&mut self) {
        self.issued += 1;
        self.applied = self.issued;
    }
}

/// Observable report store shared by all views
#[derive(Debug, Clone)]
pub struct ReportStore {
    state: Arc<watch::Sender<ReportCollectionState>>,
    clock: Arc<Mutex<SequenceClock>>,
}

impl Default for ReportStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportStore {
    pub fn new() -> Self {
        Self::with_state(ReportCollectionState::default())
    }

    pub fn with_state(initial: ReportCollectionState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self {
            state: Arc::new(tx),
            clock: Arc::new(Mutex::new(SequenceClock::default())),
        }
    }

    /// Receiver notified after every mutation
    pub fn subscribe(&self) -> watch::Receiver<ReportCollectionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> ReportCollectionState {
        self.state.borrow().clone()
    }

    /// Read the current state without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&ReportCollectionState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn set_loading(&self, loading: bool) {
        self.state.send_if_modified(|s| {
            if s.loading == loading {
                return false;
            }
            s.loading = loading;
            true
        });
    }

    /// Record a failure message, or clear it with `None`.
    /// A failed operation is no longer in flight.
    pub fn set_error(&self, error: Option<String>) {
        self.state.send_modify(|s| {
            if error.is_some() {
                s.loading = false;
            }
            s.error = error;
        });
    }

    /// Replace the whole collection after a full fetch
    pub fn replace_all(&self, reports: Vec<Report>) {
        let mut clock = self.lock_clock();
        clock.stamp_local();
        tracing::debug!("Replacing report collection with {} reports", reports.len());
        self.state.send_modify(|s| {
            s.reports = reports;
            s.settle();
        });
    }

    /// Add a report the service just created
    pub fn append(&self, report: Report) {
        let mut clock = self.lock_clock();
        clock.stamp_local();
        tracing::debug!("Appending report {}", report.id);
        self.state.send_modify(|s| {
            s.reports.push(report);
            s.settle();
        });
    }

    /// Replace the report with the same id in place.
    ///
    /// An unknown id leaves the collection untouched; only the status flags
    /// are cleared.
    pub fn replace_one(&self, report: Report) {
        let mut clock = self.lock_clock();
        self.state.send_modify(|s| {
            match s.reports.iter().position(|r| r.id == report.id) {
                Some(index) => {
                    clock.stamp_local();
                    tracing::debug!("Replacing report {} at position {}", report.id, index);
                    s.reports[index] = report;
                }
                None => {
                    tracing::warn!("Ignoring update for unknown report {}", report.id);
                }
            }
            s.settle();
        });
    }

    /// Remove every report with this id
    pub fn remove_one(&self, id: &str) {
        let mut clock = self.lock_clock();
        self.state.send_modify(|s| {
            let before = s.reports.len();
            s.reports.retain(|r| r.id != id);
            let removed = before - s.reports.len();
            if removed > 0 {
                clock.stamp_local();
            }
            tracing::debug!("Removed {} report(s) with id {}", removed, id);
            s.settle();
        });
    }

    /// Ticket for a full-list request about to be sent
    pub fn issue_ticket(&self) -> RequestTicket {
        let mut clock = self.lock_clock();
        clock.issued += 1;
        RequestTicket(clock.issued)
    }

    /// Apply a full-list response unless a newer collection change was
    /// already applied since `ticket` was issued.
    ///
    /// A discarded response still ends the request: `loading` is cleared,
    /// collection and error are kept. Returns whether the response was applied.
    pub fn replace_all_if_current(&self, ticket: RequestTicket, reports: Vec<Report>) -> bool {
        let mut clock = self.lock_clock();
        if ticket.0 < clock.applied {
            tracing::debug!(
                "Discarding stale report list (ticket {}, newest change {})",
                ticket.0,
                clock.applied
            );
            drop(clock);
            self.set_loading(false);
            return false;
        }

        clock.applied = ticket.0;
        tracing::debug!(
            "Applying report list of {} reports (ticket {})",
            reports.len(),
            ticket.0
        );
        self.state.send_modify(|s| {
            s.reports = reports;
            s.settle();
        });
        true
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, SequenceClock> {
        self.clock.lock().unwrap_or_else(|e| e.into_inner())
    }
}
