//! Dotted field paths such as `affiliations.2.label`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::PathError;

/// A validated dotted path into a manuscript.
///
/// Segments are field names, or list indices when the parent is an entity list.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "SmolStr", into = "SmolStr")]
pub struct Path(SmolStr);

impl Path {
    pub fn parse(s: &str) -> Result<Self, PathError> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        if let Some(position) = s.split('.').position(str::is_empty) {
            return Err(PathError::EmptySegment {
                path: s.into(),
                position,
            });
        }
        Ok(Self(s.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Path {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Path {
    type Error = PathError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl TryFrom<SmolStr> for Path {
    type Error = PathError;

    fn try_from(s: SmolStr) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Path> for SmolStr {
    fn from(path: Path) -> Self {
        path.0
    }
}
