//! Feed/status collaborator contract.
//!
//! Transport and authentication live behind [`StatusClient`]; this crate only
//! sequences the calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stream whose unread state is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamKind {
    /// Activity feed.
    Feed,
    /// Comments addressed to the current member.
    Comments,
}

impl StreamKind {
    /// Streams polled by one session, in poll order.
    pub const ALL: [StreamKind; 2] = [StreamKind::Feed, StreamKind::Comments];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Feed => "feed",
            Self::Comments => "comments",
        }
    }
}

impl Display for StreamKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status check response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStatus {
    /// Serialized as `has_new` by the backend.
    #[serde(alias = "has_new")]
    pub has_unseen: bool,
    /// Number of unseen items, when the endpoint reports it.
    #[serde(default)]
    pub count: Option<u64>,
}

impl StreamStatus {
    pub fn unseen(count: Option<u64>) -> Self {
        Self {
            has_unseen: true,
            count,
        }
    }

    pub fn clear() -> Self {
        Self {
            has_unseen: false,
            count: None,
        }
    }
}

/// Transport failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Backend could not be reached.
    Unreachable,
    /// Session credentials were rejected.
    Unauthorized,
    /// Backend answered with a non-success status.
    Server(u16),
    Other,
}

/// Failed round-trip to the backend. Always recoverable by retrying later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl Display for TransportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.kind {
            TransportErrorKind::Unreachable => write!(f, "backend unreachable: {}", self.message),
            TransportErrorKind::Unauthorized => write!(f, "unauthorized: {}", self.message),
            TransportErrorKind::Server(status) => {
                write!(f, "backend returned {status}: {}", self.message)
            }
            TransportErrorKind::Other => write!(f, "transport failure: {}", self.message),
        }
    }
}

impl Error for TransportError {}

/// Backend calls needed by the notification state machine.
#[async_trait]
pub trait StatusClient: Send + Sync {
    /// Asks whether `stream` has items newer than the last acknowledgement.
    async fn check_status(&self, stream: StreamKind) -> Result<StreamStatus, TransportError>;

    /// Marks every item of `stream` as read. Carries no payload.
    async fn acknowledge(&self, stream: StreamKind) -> Result<(), TransportError>;
}
