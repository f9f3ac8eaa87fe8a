//! Undo/redo management for manuscript changes.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `HistoryStack` - past/present/future linear history over `Change`s

use std::collections::VecDeque;

use crate::change::Change;
use crate::error::HistoryError;
use crate::manuscript::Manuscript;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// Snapshot of a history: applied changes, the current manuscript, and undone changes.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryState {
    /// Applied changes, oldest first. Timestamps never decrease.
    pub past: Vec<Change>,
    pub present: Manuscript,
    /// Undone changes, next to redo first.
    pub future: VecDeque<Change>,
}

/// What `push` did with a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Applied and recorded in `past`.
    Recorded,
    /// Selection-only text edit: `present` updated, nothing recorded.
    SelectionOnly,
    /// Empty change, nothing to do.
    Ignored,
}

/// Linear undo/redo history for one loaded manuscript.
#[derive(Debug, Clone)]
pub struct HistoryStack {
    state: HistoryState,
}

impl HistoryStack {
    pub fn new(manuscript: Manuscript) -> Self {
        Self {
            state: HistoryState {
                past: Vec::new(),
                present: manuscript,
                future: VecDeque::new(),
            },
        }
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn present(&self) -> &Manuscript {
        &self.state.present
    }

    pub fn past(&self) -> &[Change] {
        &self.state.past
    }

    pub fn future(&self) -> &VecDeque<Change> {
        &self.state.future
    }

    /// Record a new change. Clears the redo stack.
    ///
    /// On error nothing changes: not `present`, not `past`, not `future`.
    pub fn push(&mut self, change: Change) -> Result<PushOutcome, HistoryError> {
        if change.is_empty() {
            // Selection moves still have to show up in the document.
            if let Change::Text(_) = &change {
                self.state.present = change.apply(&self.state.present)?;
                return Ok(PushOutcome::SelectionOnly);
            }
            return Ok(PushOutcome::Ignored);
        }

        if let Some(latest) = self.state.past.last().map(Change::timestamp) {
            if change.timestamp() < latest {
                return Err(HistoryError::TimestampRegressed {
                    latest,
                    got: change.timestamp(),
                });
            }
        }

        let present = change.apply(&self.state.present)?;
        self.state.present = present;
        self.state.past.push(change);
        self.state.future.clear();
        Ok(PushOutcome::Recorded)
    }
}

impl UndoManager for HistoryStack {
    fn can_undo(&self) -> bool {
        !self.state.past.is_empty()
    }

    fn can_redo(&self) -> bool {
        !self.state.future.is_empty()
    }

    fn undo(&mut self) -> bool {
        let Some(change) = self.state.past.pop() else {
            return false;
        };
        match change.rollback(&self.state.present) {
            Ok(present) => {
                self.state.present = present;
                self.state.future.push_front(change);
                true
            }
            Err(e) => {
                tracing::error!(
                    "undo: rollback of {} change failed: {}",
                    change.kind().as_str(),
                    e
                );
                self.state.past.push(change);
                false
            }
        }
    }

    fn redo(&mut self) -> bool {
        let Some(change) = self.state.future.pop_front() else {
            return false;
        };
        match change.apply(&self.state.present) {
            Ok(present) => {
                self.state.present = present;
                self.state.past.push(change);
                true
            }
            Err(e) => {
                tracing::error!(
                    "redo: apply of {} change failed: {}",
                    change.kind().as_str(),
                    e
                );
                self.state.future.push_front(change);
                false
            }
        }
    }

    fn clear_history(&mut self) {
        self.state.past.clear();
        self.state.future.clear();
    }
}
