//! manuscript-sync: incremental background sync of manuscript history.
//!
//! This crate provides:
//! - `collect_window` - the changes a tick still has to send
//! - `SyncCoordinator` - cursor, in-flight guard and session tracking
//! - `ChangeTransport` / `HttpTransport` - request delivery
//! - `spawn_sync_task` - the periodic timer driving it all

pub mod coordinator;
pub mod error;
pub mod task;
pub mod transport;
pub mod window;

pub use coordinator::{SkipReason, SyncCoordinator, SyncCursor, SyncStatus, SyncTicket, Tick};
pub use error::SyncError;
pub use task::{SyncHandle, spawn_sync_task};
pub use transport::{ChangeTransport, HttpTransport};
pub use window::collect_window;
