//! Unread-state tracking for the activity feed and comment streams.
//!
//! # Responsibility
//! - Track `UNKNOWN -> {HAS_UNSEEN, CLEAR}` per stream from status polling.
//! - Sequence "fetch items" strictly before "acknowledge" when a view opens.
//! - Own the cancellable periodic poll for one authenticated session.
//!
//! # Invariants
//! - An acknowledgement is never sent before the fetch that justified it.
//! - A failed status check keeps the last known state.
//! - A failed acknowledgement keeps `HAS_UNSEEN`.
//! - After logout no further status checks are issued.

pub mod client;
pub mod session;
pub mod state;
