//! Invertible text edits.
//!
//! A `TextEdit` is a sequence of replace steps. Each step records the text
//! it removed as well as the text it inserted, so the inverse edit can be
//! computed without looking at the document again, no matter what happened
//! to other fields in between.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use thiserror::Error;

use crate::text::{Selection, TextBuffer, TextDocument};

/// An edit that does not fit the buffer it is applied to.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("step {step}: range {pos}..{end} is out of bounds for length {len}")]
    OutOfBounds {
        step: usize,
        pos: usize,
        end: usize,
        len: usize,
    },

    #[error("step {step}: expected to delete {expected:?}, document has {found:?}")]
    ContentMismatch {
        step: usize,
        expected: SmolStr,
        found: SmolStr,
    },
}

/// One replace step: at `pos`, `deleted` is removed and `inserted` put in its place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextStep {
    /// Character position where the step applies
    pub pos: usize,
    /// Text that was deleted (empty for pure insertions)
    #[serde(default)]
    pub deleted: SmolStr,
    /// Text that was inserted (empty for pure deletions)
    #[serde(default)]
    pub inserted: SmolStr,
}

impl TextStep {
    fn deleted_chars(&self) -> usize {
        self.deleted.chars().count()
    }

    fn inverse(&self) -> Self {
        Self {
            pos: self.pos,
            deleted: self.inserted.clone(),
            inserted: self.deleted.clone(),
        }
    }

    fn apply_to<B: TextBuffer>(&self, index: usize, buffer: &mut B) -> Result<(), EditError> {
        let len = buffer.len_chars();
        let end = match self.pos.checked_add(self.deleted_chars()) {
            Some(end) if end <= len => end,
            end => {
                return Err(EditError::OutOfBounds {
                    step: index,
                    pos: self.pos,
                    end: end.unwrap_or(usize::MAX),
                    len,
                });
            }
        };
        if !self.deleted.is_empty() {
            let found = buffer.slice(self.pos..end).unwrap_or_default();
            if found != self.deleted {
                return Err(EditError::ContentMismatch {
                    step: index,
                    expected: self.deleted.clone(),
                    found,
                });
            }
            buffer.delete(self.pos..end);
        }
        if !self.inserted.is_empty() {
            buffer.insert(self.pos, &self.inserted);
        }
        Ok(())
    }
}

/// A complete text edit: ordered steps plus the selection before and after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEdit {
    pub steps: Vec<TextStep>,
    #[serde(default)]
    pub selection_before: Selection,
    #[serde(default)]
    pub selection_after: Selection,
}

impl TextEdit {
    /// Start building an edit against the current state of `doc`.
    pub fn builder(doc: &TextDocument) -> TextEditBuilder {
        TextEditBuilder {
            original: doc.clone(),
            working: doc.clone(),
            edit: TextEdit {
                steps: Vec::new(),
                selection_before: doc.selection(),
                selection_after: doc.selection(),
            },
        }
    }

    /// A selection move with no content change.
    pub fn select(doc: &TextDocument, selection: Selection) -> Self {
        Self {
            steps: Vec::new(),
            selection_before: doc.selection(),
            selection_after: selection,
        }
    }

    /// True if any step replaces text with something different.
    ///
    /// This looks at steps, not at the net result. `TextEditBuilder::build`
    /// drops the steps of an edit whose net result is no change.
    pub fn doc_changed(&self) -> bool {
        self.steps.iter().any(|s| s.deleted != s.inserted)
    }

    /// The edit that undoes this one: steps reversed and swapped.
    pub fn invert(&self) -> Self {
        Self {
            steps: self.steps.iter().rev().map(TextStep::inverse).collect(),
            selection_before: self.selection_after,
            selection_after: self.selection_before,
        }
    }

    /// Apply every step to `buffer`, checking each one fits.
    ///
    /// On error the buffer may hold a prefix of the steps; callers that need
    /// atomicity apply to a clone.
    pub fn apply_to<B: TextBuffer>(&self, buffer: &mut B) -> Result<(), EditError> {
        for (index, step) in self.steps.iter().enumerate() {
            step.apply_to(index, buffer)?;
        }
        Ok(())
    }

    /// Apply to a document, returning the new document.
    pub fn apply(&self, doc: &TextDocument) -> Result<TextDocument, EditError> {
        let mut next = doc.clone();
        self.apply_to(&mut next)?;
        next.set_selection(self.selection_after);
        Ok(next)
    }

    /// Check the edit fits `doc` without keeping the result.
    pub fn validate(&self, doc: &TextDocument) -> Result<(), EditError> {
        self.apply(doc).map(|_| ())
    }
}

/// Builds a `TextEdit` step by step, capturing deleted text from a working copy.
pub struct TextEditBuilder {
    original: TextDocument,
    working: TextDocument,
    edit: TextEdit,
}

impl TextEditBuilder {
    pub fn insert(self, pos: usize, text: &str) -> Result<Self, EditError> {
        self.replace(pos..pos, text)
    }

    pub fn delete(self, range: std::ops::Range<usize>) -> Result<Self, EditError> {
        self.replace(range, "")
    }

    pub fn replace(mut self, range: std::ops::Range<usize>, text: &str) -> Result<Self, EditError> {
        let index = self.edit.steps.len();
        let deleted =
            self.working
                .slice(range.clone())
                .ok_or(EditError::OutOfBounds {
                    step: index,
                    pos: range.start,
                    end: range.end,
                    len: self.working.len_chars(),
                })?;
        let step = TextStep {
            pos: range.start,
            deleted,
            inserted: text.into(),
        };
        step.apply_to(index, &mut self.working)?;
        self.edit.steps.push(step);
        // Cursor lands after the inserted text unless told otherwise.
        self.edit.selection_after = Selection::collapsed(range.start + text.chars().count());
        Ok(self)
    }

    pub fn select(mut self, selection: Selection) -> Self {
        self.edit.selection_after = selection;
        self
    }

    /// Finish the edit. Steps that cancel out leave a selection-only edit.
    pub fn build(mut self) -> TextEdit {
        if self.working.content_eq(&self.original) {
            self.edit.steps.clear();
        }
        self.edit
    }
}
