//! Changes: atomic, invertible units of edit against a manuscript.
//!
//! `Change` is a closed enum. Every operation matches exhaustively, so a new
//! variant cannot be added without handling apply, rollback and encoding.

mod batch;
mod rearrange;
mod scalar;
mod text;

pub use batch::BatchChange;
pub use rearrange::RearrangeChange;
pub use scalar::ScalarChange;
pub use text::TextChange;

use manuscript_common::Clock;
use regex::Regex;
use serde_json::Value;
use smol_str::SmolStr;

use crate::edit::TextEdit;
use crate::error::ChangeError;
use crate::manuscript::{Manuscript, Node};
use crate::path::Path;

/// Wire discriminator for each variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Scalar,
    Text,
    Rearrange,
    Batch,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Scalar => "scalar",
            ChangeKind::Text => "text",
            ChangeKind::Rearrange => "rearranging",
            ChangeKind::Batch => "batch",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scalar" => Some(ChangeKind::Scalar),
            "text" => Some(ChangeKind::Text),
            "rearranging" => Some(ChangeKind::Rearrange),
            "batch" => Some(ChangeKind::Batch),
            _ => None,
        }
    }
}

/// One atomic edit to a manuscript.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Scalar(ScalarChange),
    Text(TextChange),
    Rearrange(RearrangeChange),
    Batch(BatchChange),
}

impl Change {
    /// Whole-value replace at `path`, stamped with the clock's time.
    pub fn scalar(clock: &dyn Clock, path: Path, old_value: Node, next_value: Node) -> Self {
        Change::Scalar(ScalarChange::new(
            clock.now_ms(),
            path,
            old_value,
            next_value,
        ))
    }

    pub fn text(clock: &dyn Clock, path: Path, edit: TextEdit) -> Self {
        Change::Text(TextChange::new(clock.now_ms(), path, edit))
    }

    pub fn rearrange(
        clock: &dyn Clock,
        path: Path,
        old_order: Vec<SmolStr>,
        new_order: Vec<SmolStr>,
    ) -> Result<Self, ChangeError> {
        RearrangeChange::new(clock.now_ms(), path, old_order, new_order).map(Change::Rearrange)
    }

    pub fn batch(clock: &dyn Clock, changes: impl IntoIterator<Item = Change>) -> Self {
        Change::Batch(BatchChange::new(clock.now_ms(), changes))
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Change::Scalar(_) => ChangeKind::Scalar,
            Change::Text(_) => ChangeKind::Text,
            Change::Rearrange(_) => ChangeKind::Rearrange,
            Change::Batch(_) => ChangeKind::Batch,
        }
    }

    pub fn timestamp(&self) -> i64 {
        match self {
            Change::Scalar(c) => c.timestamp,
            Change::Text(c) => c.timestamp,
            Change::Rearrange(c) => c.timestamp,
            Change::Batch(c) => c.timestamp,
        }
    }

    /// Target path. Batches have none.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Change::Scalar(c) => Some(&c.path),
            Change::Text(c) => Some(&c.path),
            Change::Rearrange(c) => Some(&c.path),
            Change::Batch(_) => None,
        }
    }

    /// True if applying this change would not alter manuscript content.
    pub fn is_empty(&self) -> bool {
        match self {
            Change::Scalar(c) => c.is_empty(),
            Change::Text(c) => c.is_empty(),
            Change::Rearrange(c) => c.is_empty(),
            Change::Batch(c) => c.is_empty(),
        }
    }

    /// Apply to `manuscript`, returning the new manuscript.
    pub fn apply(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        match self {
            Change::Scalar(c) => c.apply(manuscript),
            Change::Text(c) => c.apply(manuscript),
            Change::Rearrange(c) => c.apply(manuscript),
            Change::Batch(c) => c.apply(manuscript),
        }
    }

    /// Undo this change on a manuscript it was applied to.
    pub fn rollback(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        match self {
            Change::Scalar(c) => c.rollback(manuscript),
            Change::Text(c) => c.rollback(manuscript),
            Change::Rearrange(c) => c.rollback(manuscript),
            Change::Batch(c) => c.rollback(manuscript),
        }
    }

    /// True if this change (or any batch child) targets a path matching `pattern`.
    pub fn is_path_affected(&self, pattern: &Regex) -> bool {
        match self {
            Change::Batch(c) => c.changes().iter().any(|c| c.is_path_affected(pattern)),
            leaf => leaf
                .path()
                .is_some_and(|path| pattern.is_match(path.as_str())),
        }
    }

    /// Number of non-batch changes contained.
    pub fn leaf_count(&self) -> usize {
        match self {
            Change::Batch(c) => c.changes().iter().map(Change::leaf_count).sum(),
            _ => 1,
        }
    }

    /// Encode into the JSON wire form.
    pub fn to_json(&self) -> Value {
        crate::codec::to_json(self)
    }

    /// Decode from the JSON wire form, resolving text fields against `manuscript`.
    pub fn from_json(
        manuscript: &Manuscript,
        json: &Value,
    ) -> Result<Self, crate::error::SerializationError> {
        crate::codec::from_json(manuscript, json)
    }
}

impl From<ScalarChange> for Change {
    fn from(c: ScalarChange) -> Self {
        Change::Scalar(c)
    }
}

impl From<TextChange> for Change {
    fn from(c: TextChange) -> Self {
        Change::Text(c)
    }
}

impl From<RearrangeChange> for Change {
    fn from(c: RearrangeChange) -> Self {
        Change::Rearrange(c)
    }
}

impl From<BatchChange> for Change {
    fn from(c: BatchChange) -> Self {
        Change::Batch(c)
    }
}

#[cfg(test)]
mod tests;
