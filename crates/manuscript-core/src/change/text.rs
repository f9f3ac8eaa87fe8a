use crate::edit::TextEdit;
use crate::error::ChangeError;
use crate::manuscript::{Manuscript, Node};
use crate::path::Path;

/// One text-engine edit to the rich-text field at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct TextChange {
    pub timestamp: i64,
    pub path: Path,
    pub edit: TextEdit,
}

impl TextChange {
    pub fn new(timestamp: i64, path: Path, edit: TextEdit) -> Self {
        Self {
            timestamp,
            path,
            edit,
        }
    }

    /// Selection-only edits are empty: visible, but not worth a history entry.
    pub fn is_empty(&self) -> bool {
        !self.edit.doc_changed()
    }

    pub fn apply(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        apply_edit(manuscript, &self.path, &self.edit)
    }

    pub fn rollback(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        apply_edit(manuscript, &self.path, &self.edit.invert())
    }
}

fn apply_edit(
    manuscript: &Manuscript,
    path: &Path,
    edit: &TextEdit,
) -> Result<Manuscript, ChangeError> {
    manuscript.update(path, |node| match node {
        Node::Text(doc) => edit
            .apply(doc)
            .map(Node::Text)
            .map_err(|source| ChangeError::Edit {
                path: path.as_str().into(),
                source,
            }),
        other => Err(ChangeError::KindMismatch {
            path: path.as_str().into(),
            expected: "text",
            found: other.kind_name(),
        }),
    })
}
