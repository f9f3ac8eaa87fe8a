use crate::change::Change;
use crate::error::ChangeError;
use crate::manuscript::Manuscript;

/// Ordered composite of changes, applied and rolled back as one unit.
///
/// Application is all-or-nothing: if any child fails, the whole batch fails
/// and the caller keeps the manuscript it passed in.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchChange {
    pub timestamp: i64,
    changes: Vec<Change>,
}

impl BatchChange {
    /// Empty children are dropped.
    pub fn new(timestamp: i64, changes: impl IntoIterator<Item = Change>) -> Self {
        Self {
            timestamp,
            changes: changes.into_iter().filter(|c| !c.is_empty()).collect(),
        }
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Children left to right.
    pub fn apply(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        let mut current = manuscript.clone();
        for (index, change) in self.changes.iter().enumerate() {
            current = change.apply(&current).map_err(|source| {
                tracing::debug!("batch: child {} failed, discarding batch: {}", index, source);
                ChangeError::BatchChild {
                    index,
                    source: Box::new(source),
                }
            })?;
        }
        Ok(current)
    }

    /// Children right to left, each with its own rollback.
    pub fn rollback(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        let mut current = manuscript.clone();
        for (index, change) in self.changes.iter().enumerate().rev() {
            current = change
                .rollback(&current)
                .map_err(|source| ChangeError::BatchChild {
                    index,
                    source: Box::new(source),
                })?;
        }
        Ok(current)
    }
}
