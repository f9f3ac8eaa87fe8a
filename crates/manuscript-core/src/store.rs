//! Store holding the loaded manuscript's history.
//!
//! All history mutation goes through [`ManuscriptStore::dispatch`], one
//! action at a time. The store also hands out a session generation that
//! changes every time a manuscript is loaded or unloaded, so work started
//! against an older session can tell it is stale.

use crate::actions::EditorAction;
use crate::change::Change;
use crate::manuscript::Manuscript;
use crate::undo::{HistoryStack, PushOutcome, UndoManager};

#[derive(Debug, Default)]
pub struct ManuscriptStore {
    history: Option<HistoryStack>,
    generation: u64,
}

impl ManuscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Option<&HistoryStack> {
        self.history.as_ref()
    }

    pub fn present(&self) -> Option<&Manuscript> {
        self.history.as_ref().map(HistoryStack::present)
    }

    pub fn is_loaded(&self) -> bool {
        self.history.is_some()
    }

    /// Session generation, bumped on every load and unload.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn can_undo(&self) -> bool {
        self.history.as_ref().is_some_and(HistoryStack::can_undo)
    }

    pub fn can_redo(&self) -> bool {
        self.history.as_ref().is_some_and(HistoryStack::can_redo)
    }

    /// Apply an action.
    ///
    /// Returns true if the store changed. Failures are logged, never surfaced.
    pub fn dispatch(&mut self, action: &EditorAction) -> bool {
        match action {
            EditorAction::Load(manuscript) => self.load(manuscript.clone()),
            EditorAction::Edit(change) => self.edit(change),
            EditorAction::Undo => self.with_history(action, <HistoryStack as UndoManager>::undo),
            EditorAction::Redo => self.with_history(action, <HistoryStack as UndoManager>::redo),
            EditorAction::Unload => self.unload(),
        }
    }

    fn load(&mut self, manuscript: Manuscript) -> bool {
        self.history = Some(HistoryStack::new(manuscript));
        self.generation += 1;
        tracing::debug!("store: loaded manuscript, generation {}", self.generation);
        true
    }

    fn unload(&mut self) -> bool {
        if self.history.take().is_none() {
            return false;
        }
        self.generation += 1;
        true
    }

    fn edit(&mut self, change: &Change) -> bool {
        let Some(history) = self.history.as_mut() else {
            tracing::warn!("store: edit dispatched with no manuscript loaded");
            return false;
        };
        match history.push(change.clone()) {
            Ok(PushOutcome::Recorded | PushOutcome::SelectionOnly) => true,
            Ok(PushOutcome::Ignored) => false,
            Err(e) => {
                tracing::error!("store: rejected {} change: {}", change.kind().as_str(), e);
                false
            }
        }
    }

    fn with_history(
        &mut self,
        action: &EditorAction,
        f: impl FnOnce(&mut HistoryStack) -> bool,
    ) -> bool {
        match self.history.as_mut() {
            Some(history) => f(history),
            None => {
                tracing::debug!("store: {} with no manuscript loaded", action.name());
                false
            }
        }
    }
}
