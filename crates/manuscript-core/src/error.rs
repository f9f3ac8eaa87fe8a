//! Error types for change application, history and serialization.

use miette::Diagnostic;
use smol_str::SmolStr;
use thiserror::Error;

use crate::edit::EditError;

/// A malformed path string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path must not be empty")]
    Empty,

    #[error("path {path:?} has an empty segment at position {position}")]
    EmptySegment { path: SmolStr, position: usize },
}

/// Errors raised while applying or rolling back a change.
///
/// Every variant except `BatchChild` means the change and the manuscript
/// disagree about structure, which a correct producer never causes.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ChangeError {
    /// The path does not resolve against the manuscript.
    #[error("path {path} does not resolve: {reason}")]
    PathResolution { path: SmolStr, reason: SmolStr },

    /// The path resolves, but to the wrong kind of field.
    #[error("expected {expected} at {path}, found {found}")]
    KindMismatch {
        path: SmolStr,
        expected: &'static str,
        found: &'static str,
    },

    /// A text edit does not fit the document it is applied to.
    #[error("text edit at {path} does not fit the document")]
    Edit {
        path: SmolStr,
        #[source]
        source: EditError,
    },

    /// Reorder ids do not match the list or each other.
    #[error("cannot reorder {path}: {reason}")]
    OrderMismatch { path: SmolStr, reason: SmolStr },

    /// A batch child failed; the batch as a whole was not applied.
    #[error("batch child {index} failed")]
    BatchChild {
        index: usize,
        #[source]
        source: Box<ChangeError>,
    },
}

/// Errors raised by [`crate::HistoryStack::push`].
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Apply(#[from] ChangeError),

    /// Timestamps in the past stack must never go backwards.
    #[error("change timestamp {got} is older than the latest recorded change ({latest})")]
    TimestampRegressed { latest: i64, got: i64 },
}

/// Errors raised while decoding changes from their JSON wire form.
#[derive(Error, Debug, Diagnostic)]
#[non_exhaustive]
pub enum SerializationError {
    #[error(transparent)]
    #[diagnostic(code(manuscript::serde::json))]
    Json(#[from] serde_json::Error),

    #[error("missing or invalid field `{field}` in {change_type} change")]
    #[diagnostic(code(manuscript::serde::field))]
    Field {
        change_type: &'static str,
        field: &'static str,
    },

    #[error("unknown change type {0:?}")]
    #[diagnostic(
        code(manuscript::serde::unknown_type),
        help("expected one of: scalar, text, rearranging, batch")
    )]
    UnknownType(String),

    #[error(transparent)]
    #[diagnostic(code(manuscript::serde::path))]
    Path(#[from] PathError),

    #[error("text change at {path} does not validate against the manuscript")]
    #[diagnostic(code(manuscript::serde::text_edit))]
    InvalidTextEdit {
        path: SmolStr,
        #[source]
        source: ChangeError,
    },

    #[error("change is inconsistent with the manuscript")]
    #[diagnostic(code(manuscript::serde::inconsistent))]
    Inconsistent(#[source] ChangeError),

    #[error("change {index} in sequence is invalid")]
    #[diagnostic(code(manuscript::serde::entry))]
    Entry {
        index: usize,
        #[source]
        source: Box<SerializationError>,
    },
}
