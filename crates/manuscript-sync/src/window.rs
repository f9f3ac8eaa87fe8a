//! Selection of the changes a sync tick has to send.

use manuscript_core::{BatchChange, HistoryState};

/// Past changes with `since < timestamp <= now`, as one batch stamped `now`.
///
/// Relies on `past` timestamps never decreasing, which `HistoryStack::push`
/// enforces.
pub fn collect_window(history: &HistoryState, since: i64, now: i64) -> BatchChange {
    let past = &history.past;
    let start = past.partition_point(|c| c.timestamp() <= since);
    let end = past.partition_point(|c| c.timestamp() <= now);
    let window = if start < end { &past[start..end] } else { &[][..] };
    BatchChange::new(now, window.iter().cloned())
}
