use std::collections::HashSet;

use im::Vector;
use smol_str::SmolStr;

use crate::error::ChangeError;
use crate::manuscript::{Entity, Manuscript, Node};
use crate::path::Path;

/// Pure reorder of the entity list at `path`, by stable id.
///
/// Ids rather than indices are stored so the change still means the same
/// thing if list membership differs between snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct RearrangeChange {
    pub timestamp: i64,
    pub path: Path,
    pub old_order: Vec<SmolStr>,
    pub new_order: Vec<SmolStr>,
}

impl RearrangeChange {
    /// Both orders must hold the same ids, each exactly once.
    pub fn new(
        timestamp: i64,
        path: Path,
        old_order: Vec<SmolStr>,
        new_order: Vec<SmolStr>,
    ) -> Result<Self, ChangeError> {
        let mismatch = |reason: &str| ChangeError::OrderMismatch {
            path: path.as_str().into(),
            reason: reason.into(),
        };
        let old_ids: HashSet<&SmolStr> = old_order.iter().collect();
        let new_ids: HashSet<&SmolStr> = new_order.iter().collect();
        if old_ids.len() != old_order.len() || new_ids.len() != new_order.len() {
            return Err(mismatch("order contains duplicate ids"));
        }
        if old_ids != new_ids {
            return Err(mismatch("old and new order hold different ids"));
        }
        Ok(Self {
            timestamp,
            path,
            old_order,
            new_order,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.old_order == self.new_order
    }

    pub fn apply(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        reorder_at(manuscript, &self.path, &self.new_order)
    }

    pub fn rollback(&self, manuscript: &Manuscript) -> Result<Manuscript, ChangeError> {
        reorder_at(manuscript, &self.path, &self.old_order)
    }
}

fn reorder_at(
    manuscript: &Manuscript,
    path: &Path,
    order: &[SmolStr],
) -> Result<Manuscript, ChangeError> {
    manuscript.update(path, |node| match node {
        Node::List(items) => reorder(path, items, order).map(Node::List),
        other => Err(ChangeError::KindMismatch {
            path: path.as_str().into(),
            expected: "list",
            found: other.kind_name(),
        }),
    })
}

/// Entities named in `order` come first, in that order; the rest keep their
/// relative order at the end.
fn reorder(
    path: &Path,
    items: &Vector<Entity>,
    order: &[SmolStr],
) -> Result<Vector<Entity>, ChangeError> {
    let mut result = Vector::new();
    for id in order {
        let entity = items
            .iter()
            .find(|e| &e.id == id)
            .ok_or_else(|| ChangeError::OrderMismatch {
                path: path.as_str().into(),
                reason: format!("no entity with id `{id}`").into(),
            })?;
        result.push_back(entity.clone());
    }
    result.extend(items.iter().filter(|e| !order.contains(&e.id)).cloned());
    Ok(result)
}
