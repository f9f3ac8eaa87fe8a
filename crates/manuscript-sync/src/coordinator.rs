//! Sync coordinator state.
//!
//! The coordinator decides, per tick, whether a request goes out and what it
//! carries, and applies the result when the request finishes. It does no I/O
//! itself; [`crate::task`] drives it from a timer.

use manuscript_core::{ManuscriptStore, codec};
use serde_json::Value;
use smol_str::{SmolStr, ToSmolStr};

use crate::error::SyncError;
use crate::window::collect_window;

/// Position of the last acknowledged sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyncCursor {
    pub last_sync_timestamp: i64,
    pub last_sync_successful: bool,
}

impl SyncCursor {
    /// Server confirmed everything up to `window_end`.
    pub fn acknowledge(&mut self, window_end: i64) {
        self.last_sync_timestamp = window_end;
        self.last_sync_successful = true;
    }

    /// Request failed. The timestamp stays so the next window includes the same changes.
    pub fn mark_failed(&mut self) {
        self.last_sync_successful = false;
    }
}

/// Sync state as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    /// Nothing sent yet in this session.
    #[default]
    Idle,
    /// A request is outstanding.
    Syncing,
    /// Last request was acknowledged.
    Synced,
    /// Last request failed; changes are retried on the next tick.
    Failed(SmolStr),
}

impl SyncStatus {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Why a tick did not send anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotLoaded,
    InFlight,
    NothingPending,
}

/// Identifies an outstanding request so its result can be matched to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncTicket {
    session: u64,
    epoch: u64,
    window_end: i64,
}

impl SyncTicket {
    pub fn window_end(&self) -> i64 {
        self.window_end
    }
}

/// Outcome of [`SyncCoordinator::begin_tick`].
#[derive(Debug)]
pub enum Tick {
    Skip(SkipReason),
    Send { ticket: SyncTicket, body: Value },
}

#[derive(Debug, Default)]
pub struct SyncCoordinator {
    cursor: SyncCursor,
    status: SyncStatus,
    /// Store generation the cursor belongs to.
    session: Option<u64>,
    /// Bumped by `cancel`; results from an older epoch are dropped.
    epoch: u64,
    in_flight: bool,
}

impl SyncCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self) -> SyncCursor {
        self.cursor
    }

    pub fn status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Decide what this tick sends.
    ///
    /// The window closes at `now - 1`, the last millisecond no later edit can
    /// be stamped with, and becomes the cursor position if the request is
    /// acknowledged. Changes stamped `now` go out on the next tick. This
    /// holds as long as edits are stamped by a clock that never goes
    /// backwards, such as `SystemClock`.
    pub fn begin_tick(&mut self, store: &ManuscriptStore, now: i64) -> Tick {
        let Some(history) = store.history() else {
            if self.session.take().is_some() {
                self.reset();
            }
            return Tick::Skip(SkipReason::NotLoaded);
        };

        if self.session != Some(store.generation()) {
            if self.session.is_some() {
                tracing::debug!(
                    "sync: manuscript reloaded, starting session {}",
                    store.generation()
                );
            }
            self.reset();
            self.session = Some(store.generation());
        }

        if self.in_flight {
            tracing::debug!("sync: previous request still outstanding, skipping tick");
            return Tick::Skip(SkipReason::InFlight);
        }

        let window_end = now.saturating_sub(1);
        let since = self.cursor.last_sync_timestamp;
        let window = collect_window(history.state(), since, window_end);
        if window.is_empty() {
            return Tick::Skip(SkipReason::NothingPending);
        }

        tracing::debug!(
            "sync: sending {} changes ({} leaf changes) up to {}",
            window.len(),
            window.changes().iter().map(|c| c.leaf_count()).sum::<usize>(),
            window_end
        );
        self.in_flight = true;
        self.status = SyncStatus::Syncing;
        Tick::Send {
            ticket: SyncTicket {
                session: store.generation(),
                epoch: self.epoch,
                window_end,
            },
            body: codec::to_json_array(window.changes()),
        }
    }

    /// Apply the result of a request started by `begin_tick`.
    ///
    /// Returns false if the ticket belongs to a cancelled or replaced session;
    /// such results never touch the cursor.
    pub fn complete(&mut self, ticket: SyncTicket, result: Result<(), SyncError>) -> bool {
        if ticket.epoch != self.epoch || Some(ticket.session) != self.session {
            tracing::debug!("sync: dropping result for stale session {}", ticket.session);
            return false;
        }
        self.in_flight = false;
        match result {
            Ok(()) => {
                self.cursor.acknowledge(ticket.window_end);
                self.status = SyncStatus::Synced;
            }
            Err(e) => {
                tracing::warn!("sync: request failed, will retry: {}", e);
                self.cursor.mark_failed();
                self.status = SyncStatus::Failed(e.to_smolstr());
            }
        }
        true
    }

    /// Forget any outstanding request. Its result will be ignored.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.in_flight = false;
        if self.status.is_syncing() {
            self.status = SyncStatus::Idle;
        }
    }

    fn reset(&mut self) {
        self.cancel();
        self.cursor = SyncCursor::default();
        self.status = SyncStatus::Idle;
    }
}
