use crate::error::ChangeError;
use crate::manuscript::{Manuscript, Node};
use crate::path::Path;

/// Whole-value replace of the node at `path`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarChange {
    pub timestamp: i64,
    pub path: Path,
    pub old_value: Node,
    pub next_value: Node,
}

impl ScalarChange {
    pub fn new(timestamp: i64, path: Path, old_value: Node, next_value: Node) -> Self {
        Self {
            timestamp,
            path,
            old_value,
            next_value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.old_value.content_eq(&self.next_value)
    }

    pub fn apply(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        manuscript.set(&self.path, self.next_value.clone())
    }

    pub fn rollback(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        manuscript.set(&self.path, self.old_value.clone())
    }
}
