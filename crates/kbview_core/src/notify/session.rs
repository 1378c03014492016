//! Notification session: status polling and view acknowledgement.
//!
//! # Responsibility
//! - Issue a status check per stream at login and then every poll interval.
//! - Run "fetch, then acknowledge" when a stream's view is entered.
//! - Cancel the periodic poll on logout or drop.
//!
//! # Invariants
//! - State locks are never held across an await point.
//! - Concurrent status checks resolve last-write-wins.
//! - The acknowledgement decision uses the state captured at view entry.

use crate::notify::client::{StatusClient, StreamKind, TransportError};
use crate::notify::state::{NotificationState, UnseenState};
use log::{info, warn};
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Default status poll interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Outcome of the acknowledgement step of [`NotificationSession::enter_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    /// Stream was not `HAS_UNSEEN` at view entry; nothing was sent.
    NotNeeded,
    /// Acknowledgement succeeded; stream is `CLEAR`.
    Sent,
    /// Acknowledgement failed; stream stays `HAS_UNSEEN` for a later retry.
    Failed(TransportError),
}

/// Items fetched for a view plus what happened to the unread state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewEntry<T> {
    pub items: T,
    pub acknowledgement: Acknowledgement,
}

#[derive(Debug, Default)]
struct StreamStates {
    feed: Mutex<NotificationState>,
    comments: Mutex<NotificationState>,
}

impl StreamStates {
    fn lock(&self, stream: StreamKind) -> MutexGuard<'_, NotificationState> {
        let slot = match stream {
            StreamKind::Feed => &self.feed,
            StreamKind::Comments => &self.comments,
        };
        slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shared between the session handle and its poll task.
struct SessionCore {
    session_id: Uuid,
    client: Arc<dyn StatusClient>,
    states: StreamStates,
}

impl SessionCore {
    /// Runs one status check. Failure keeps the last known state.
    async fn check(&self, stream: StreamKind) -> UnseenState {
        match self.client.check_status(stream).await {
            Ok(status) => {
                let (previous, current) = {
                    let mut state = self.states.lock(stream);
                    let previous = state.apply_status(status);
                    (previous, state.state)
                };
                if previous != current {
                    info!(
                        "event=notification_transition module=notify session={} stream={} from={} to={} cause=status",
                        self.session_id, stream, previous, current
                    );
                }
                current
            }
            Err(err) => {
                warn!(
                    "event=status_check_failed module=notify status=error session={} stream={} error={}",
                    self.session_id, stream, err
                );
                self.states.lock(stream).state
            }
        }
    }
}

/// Unread tracking for one authenticated session.
///
/// Created by [`NotificationSession::login`] inside a tokio runtime. Dropping
/// the session cancels its poll task.
pub struct NotificationSession {
    core: Arc<SessionCore>,
    shutdown: CancellationToken,
    poller: Option<JoinHandle<()>>,
}

impl NotificationSession {
    /// Starts a session: checks every stream now, then every `poll_interval`.
    ///
    /// A zero interval is clamped to one second.
    pub fn login(client: Arc<dyn StatusClient>, poll_interval: Duration) -> Self {
        let poll_interval = poll_interval.max(Duration::from_secs(1));
        let core = Arc::new(SessionCore {
            session_id: Uuid::new_v4(),
            client,
            states: StreamStates::default(),
        });
        let shutdown = CancellationToken::new();

        info!(
            "event=session_start module=notify status=ok session={} poll_interval_secs={}",
            core.session_id,
            poll_interval.as_secs()
        );

        let poller = tokio::spawn(run_poller(
            Arc::clone(&core),
            poll_interval,
            shutdown.clone(),
        ));

        Self {
            core,
            shutdown,
            poller: Some(poller),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.core.session_id
    }

    /// Current state of one stream.
    pub fn snapshot(&self, stream: StreamKind) -> NotificationState {
        *self.core.states.lock(stream)
    }

    /// Returns `true` when any stream is `HAS_UNSEEN`.
    pub fn has_any_unseen(&self) -> bool {
        StreamKind::ALL
            .iter()
            .any(|stream| self.snapshot(*stream).has_unseen())
    }

    /// Manual status check alongside the periodic poll.
    ///
    /// Never fails; on transport failure the last known state is returned.
    pub async fn refresh(&self, stream: StreamKind) -> UnseenState {
        self.core.check(stream).await
    }

    /// Opens the view of `stream`: fetches its items, then acknowledges.
    ///
    /// The acknowledgement is sent only after `fetch` has completed, and only
    /// when the stream was `HAS_UNSEEN` when the view was entered.
    ///
    /// # Errors
    /// - Returns the fetch error unchanged; no acknowledgement is sent then.
    pub async fn enter_view<T, F, Fut>(
        &self,
        stream: StreamKind,
        fetch: F,
    ) -> Result<ViewEntry<T>, TransportError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let session_id = self.core.session_id;
        let entry_state = self.snapshot(stream).state;

        let items = match fetch().await {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    "event=view_fetch_failed module=notify status=error session={} stream={} error={}",
                    session_id, stream, err
                );
                return Err(err);
            }
        };

        if entry_state != UnseenState::HasUnseen {
            return Ok(ViewEntry {
                items,
                acknowledgement: Acknowledgement::NotNeeded,
            });
        }

        let acknowledgement = match self.core.client.acknowledge(stream).await {
            Ok(()) => {
                let previous = self
                    .core
                    .states
                    .lock(stream)
                    .apply_acknowledged(now_epoch_ms());
                info!(
                    "event=notification_transition module=notify session={} stream={} from={} to={} cause=acknowledged",
                    session_id,
                    stream,
                    previous,
                    UnseenState::Clear
                );
                Acknowledgement::Sent
            }
            Err(err) => {
                warn!(
                    "event=acknowledge_failed module=notify status=error session={} stream={} error={}",
                    session_id, stream, err
                );
                Acknowledgement::Failed(err)
            }
        };

        Ok(ViewEntry {
            items,
            acknowledgement,
        })
    }

    /// Ends the session and waits for the poll task to stop.
    pub async fn logout(mut self) {
        self.shutdown.cancel();
        if let Some(poller) = self.poller.take() {
            if let Err(err) = poller.await {
                if !err.is_cancelled() {
                    warn!(
                        "event=poller_join_failed module=notify status=error session={} error={}",
                        self.core.session_id, err
                    );
                }
            }
        }
        info!(
            "event=session_end module=notify status=ok session={}",
            self.core.session_id
        );
    }
}

impl Drop for NotificationSession {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn run_poller(core: Arc<SessionCore>, poll_interval: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return,
            _ = ticker.tick() => {}
        }

        for stream in StreamKind::ALL {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return,
                _ = core.check(stream) => {}
            }
        }
    }
}

fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
