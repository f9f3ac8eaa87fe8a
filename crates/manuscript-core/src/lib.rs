//! manuscript-core: change tracking for composite manuscripts.
//!
//! This crate provides:
//! - `Manuscript` - immutable tree of scalar, text, record and list fields
//! - `Change` - invertible edits (scalar, text, rearrange, batch)
//! - `HistoryStack` - past/present/future undo history
//! - `codec` - the JSON wire form of changes
//! - `ManuscriptStore` - single entry point for dispatched actions

pub mod actions;
pub mod change;
pub mod codec;
pub mod edit;
pub mod error;
pub mod manuscript;
pub mod path;
pub mod store;
pub mod text;
pub mod undo;

pub use actions::EditorAction;
pub use change::{BatchChange, Change, ChangeKind, RearrangeChange, ScalarChange, TextChange};
pub use edit::{EditError, TextEdit, TextEditBuilder, TextStep};
pub use error::{ChangeError, HistoryError, PathError, SerializationError};
pub use manuscript::{Entity, Fields, Manuscript, Node};
pub use path::Path;
pub use smol_str::SmolStr;
pub use store::ManuscriptStore;
pub use text::{Selection, TextBuffer, TextDocument};
pub use undo::{HistoryStack, HistoryState, PushOutcome, UndoManager};
