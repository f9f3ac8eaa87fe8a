//! Error types for sync operations.

use thiserror::Error;

/// Errors that can occur while sending changes.
///
/// All of them are recoverable: the next tick retries with a window that
/// still contains every unacknowledged change.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SyncError {
    /// The request never got a response.
    #[error("sync request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("sync endpoint returned status {status}")]
    Status { status: u16 },
}
