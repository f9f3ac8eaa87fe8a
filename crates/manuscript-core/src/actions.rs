//! Store actions.
//!
//! `EditorAction` is the complete set of operations the UI can request
//! against the loaded manuscript. They are applied with
//! [`crate::ManuscriptStore::dispatch`].

use crate::change::Change;
use crate::manuscript::Manuscript;

#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Replace whatever is loaded with a fresh history over this manuscript.
    Load(Manuscript),
    /// Record a change against the loaded manuscript.
    Edit(Change),
    Undo,
    Redo,
    /// Drop the loaded manuscript and its history.
    Unload,
}

impl EditorAction {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            EditorAction::Load(_) => "load",
            EditorAction::Edit(_) => "edit",
            EditorAction::Undo => "undo",
            EditorAction::Redo => "redo",
            EditorAction::Unload => "unload",
        }
    }
}
