//! Per-stream unread state machine.
//!
//! # Invariants
//! - Starts `Unknown`; only status results and acknowledgements move it.
//! - `Clear` after an acknowledgement drops the unseen count.

use crate::notify::client::StreamStatus;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Unread state of one stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnseenState {
    /// No status check has succeeded yet.
    Unknown,
    HasUnseen,
    Clear,
}

impl UnseenState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::HasUnseen => "HAS_UNSEEN",
            Self::Clear => "CLEAR",
        }
    }
}

impl Display for UnseenState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot consumed by UI badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationState {
    pub state: UnseenState,
    /// Unseen item count, when the status endpoint reports one.
    pub unseen_count: Option<u64>,
    /// Epoch ms of the last successful acknowledgement in this session.
    pub last_acknowledged_at: Option<i64>,
}

impl Default for NotificationState {
    fn default() -> Self {
        Self {
            state: UnseenState::Unknown,
            unseen_count: None,
            last_acknowledged_at: None,
        }
    }
}

impl NotificationState {
    pub fn has_unseen(&self) -> bool {
        self.state == UnseenState::HasUnseen
    }

    /// Applies one successful status check. Returns the previous state.
    pub fn apply_status(&mut self, status: StreamStatus) -> UnseenState {
        let previous = self.state;
        if status.has_unseen {
            self.state = UnseenState::HasUnseen;
            self.unseen_count = status.count;
        } else {
            self.state = UnseenState::Clear;
            self.unseen_count = None;
        }
        previous
    }

    /// Applies one successful acknowledgement. Returns the previous state.
    pub fn apply_acknowledged(&mut self, at_epoch_ms: i64) -> UnseenState {
        let previous = self.state;
        self.state = UnseenState::Clear;
        self.unseen_count = None;
        self.last_acknowledged_at = Some(at_epoch_ms);
        previous
    }
}

#[cfg(test)]
mod tests {
    use super::{NotificationState, UnseenState};
    use crate::notify::client::StreamStatus;

    #[test]
    fn status_results_drive_transitions() {
        let mut state = NotificationState::default();
        assert_eq!(state.state, UnseenState::Unknown);

        assert_eq!(
            state.apply_status(StreamStatus::unseen(Some(2))),
            UnseenState::Unknown
        );
        assert!(state.has_unseen());
        assert_eq!(state.unseen_count, Some(2));

        assert_eq!(
            state.apply_status(StreamStatus::clear()),
            UnseenState::HasUnseen
        );
        assert_eq!(state.state, UnseenState::Clear);
        assert_eq!(state.unseen_count, None);
    }

    #[test]
    fn acknowledgement_clears_and_stamps() {
        let mut state = NotificationState::default();
        state.apply_status(StreamStatus::unseen(None));
        state.apply_acknowledged(1_700_000_000_000);
        assert_eq!(state.state, UnseenState::Clear);
        assert_eq!(state.last_acknowledged_at, Some(1_700_000_000_000));
    }
}
