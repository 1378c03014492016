//! Activity feed run-length deduplication.
//!
//! # Responsibility
//! - Collapse bursts of the same action on the same subject into one entry.
//!
//! # Invariants
//! - Input order is preserved; events are only dropped, never reordered.
//! - Only adjacent repeats collapse: an event is dropped when it matches the
//!   previously KEPT event, so interleaved activity keeps every entry.
//! - With newest-first input, the kept entry is the most recent of its run.

use crate::model::feed::FeedEvent;
use log::debug;

/// Keeps an item unless `same_run` says it repeats the last kept item.
pub fn collapse_runs<T, F>(items: impl IntoIterator<Item = T>, mut same_run: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> bool,
{
    let mut kept: Vec<T> = Vec::new();
    for item in items {
        if kept.last().is_some_and(|last| same_run(last, &item)) {
            continue;
        }
        kept.push(item);
    }
    kept
}

/// Deduplicates a newest-first activity feed by `(subject_id, action_type)` runs.
pub fn dedupe_feed(events: impl IntoIterator<Item = FeedEvent>) -> Vec<FeedEvent> {
    let events: Vec<FeedEvent> = events.into_iter().collect();
    let received = events.len();
    let kept = collapse_runs(events, FeedEvent::same_activity);
    debug!(
        "event=feed_deduped module=service received={} kept={}",
        received,
        kept.len()
    );
    kept
}
