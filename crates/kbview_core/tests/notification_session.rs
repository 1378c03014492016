use async_trait::async_trait;
use kbview_core::{
    Acknowledgement, NotificationSession, StatusClient, StreamKind, StreamStatus, TransportError,
    TransportErrorKind, UnseenState,
};
use pretty_assertions::assert_eq;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const POLL: Duration = Duration::from_secs(60);

/// Status client double that records call order and replays scripted replies.
#[derive(Default)]
struct RecordingClient {
    calls: Arc<Mutex<Vec<String>>>,
    statuses: Mutex<VecDeque<Result<StreamStatus, TransportError>>>,
    fallback: Mutex<Option<StreamStatus>>,
    ack_failures: Mutex<usize>,
}

impl RecordingClient {
    fn with_status(status: StreamStatus) -> Self {
        let client = Self::default();
        *client.fallback.lock().unwrap() = Some(status);
        client
    }

    fn script(&self, reply: Result<StreamStatus, TransportError>) {
        self.statuses.lock().unwrap().push_back(reply);
    }

    fn fail_next_ack(&self) {
        *self.ack_failures.lock().unwrap() += 1;
    }

    fn log(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn status_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with("status:"))
            .count()
    }
}

#[async_trait]
impl StatusClient for RecordingClient {
    async fn check_status(&self, stream: StreamKind) -> Result<StreamStatus, TransportError> {
        self.calls.lock().unwrap().push(format!("status:{stream}"));
        if let Some(reply) = self.statuses.lock().unwrap().pop_front() {
            return reply;
        }
        Ok(self
            .fallback
            .lock()
            .unwrap()
            .unwrap_or_else(StreamStatus::clear))
    }

    async fn acknowledge(&self, stream: StreamKind) -> Result<(), TransportError> {
        self.calls.lock().unwrap().push(format!("ack:{stream}"));
        let mut failures = self.ack_failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(TransportError::new(
                TransportErrorKind::Server(503),
                "unavailable",
            ));
        }
        Ok(())
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(10)).await;
}

#[tokio::test(start_paused = true)]
async fn login_checks_every_stream_immediately() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::unseen(Some(2))));
    let session = NotificationSession::login(client.clone(), POLL);

    assert_eq!(session.snapshot(StreamKind::Feed).state, UnseenState::Unknown);
    settle().await;

    assert_eq!(client.calls(), vec!["status:feed", "status:comments"]);
    let comments = session.snapshot(StreamKind::Comments);
    assert_eq!(comments.state, UnseenState::HasUnseen);
    assert_eq!(comments.unseen_count, Some(2));
    assert!(session.has_any_unseen());

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn poll_repeats_every_interval() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    let session = NotificationSession::login(client.clone(), POLL);

    settle().await;
    assert_eq!(client.status_calls(), 2);

    tokio::time::sleep(POLL).await;
    assert_eq!(client.status_calls(), 4);

    tokio::time::sleep(POLL).await;
    assert_eq!(client.status_calls(), 6);

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn acknowledgement_follows_completed_fetch() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::unseen(None)));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    let log = client.log();
    let visit = session
        .enter_view(StreamKind::Feed, || async move {
            log.lock().unwrap().push("fetch:start".to_string());
            tokio::time::sleep(Duration::from_secs(5)).await;
            log.lock().unwrap().push("fetch:done".to_string());
            Ok(vec!["item-1", "item-2"])
        })
        .await
        .expect("fetch succeeds");

    assert_eq!(visit.items, vec!["item-1", "item-2"]);
    assert_eq!(visit.acknowledgement, Acknowledgement::Sent);
    assert_eq!(
        client.calls(),
        vec![
            "status:feed",
            "status:comments",
            "fetch:start",
            "fetch:done",
            "ack:feed",
        ]
    );

    let feed = session.snapshot(StreamKind::Feed);
    assert_eq!(feed.state, UnseenState::Clear);
    assert!(feed.last_acknowledged_at.is_some());
    assert_eq!(
        session.snapshot(StreamKind::Comments).state,
        UnseenState::HasUnseen
    );

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn clear_stream_is_not_acknowledged() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    let visit = session
        .enter_view(StreamKind::Comments, || async { Ok(3_usize) })
        .await
        .expect("fetch succeeds");

    assert_eq!(visit.acknowledgement, Acknowledgement::NotNeeded);
    assert!(!client.calls().iter().any(|call| call.starts_with("ack:")));

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn failed_fetch_sends_no_acknowledgement() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::unseen(None)));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    let err = session
        .enter_view::<Vec<String>, _, _>(StreamKind::Feed, || async {
            Err(TransportError::new(TransportErrorKind::Unreachable, "offline"))
        })
        .await
        .expect_err("fetch failure is surfaced");

    assert_eq!(err.kind, TransportErrorKind::Unreachable);
    assert!(!client.calls().iter().any(|call| call.starts_with("ack:")));
    assert_eq!(
        session.snapshot(StreamKind::Feed).state,
        UnseenState::HasUnseen
    );

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn failed_acknowledgement_keeps_unseen_for_retry() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::unseen(None)));
    client.fail_next_ack();
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    let visit = session
        .enter_view(StreamKind::Feed, || async { Ok(()) })
        .await
        .expect("fetch succeeds");
    assert!(matches!(visit.acknowledgement, Acknowledgement::Failed(_)));
    assert_eq!(
        session.snapshot(StreamKind::Feed).state,
        UnseenState::HasUnseen
    );

    let retry = session
        .enter_view(StreamKind::Feed, || async { Ok(()) })
        .await
        .expect("fetch succeeds");
    assert_eq!(retry.acknowledgement, Acknowledgement::Sent);
    assert_eq!(session.snapshot(StreamKind::Feed).state, UnseenState::Clear);

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn failed_status_check_keeps_last_known_state() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    client.script(Ok(StreamStatus::unseen(Some(1))));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;
    assert_eq!(
        session.snapshot(StreamKind::Feed).state,
        UnseenState::HasUnseen
    );

    client.script(Err(TransportError::new(
        TransportErrorKind::Unreachable,
        "timeout",
    )));
    let state = session.refresh(StreamKind::Feed).await;

    assert_eq!(state, UnseenState::HasUnseen);
    assert_eq!(
        session.snapshot(StreamKind::Feed).unseen_count,
        Some(1)
    );

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn manual_refresh_updates_state() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    client.script(Ok(StreamStatus::unseen(Some(4))));
    assert_eq!(
        session.refresh(StreamKind::Comments).await,
        UnseenState::HasUnseen
    );
    assert_eq!(
        session.snapshot(StreamKind::Comments).unseen_count,
        Some(4)
    );

    session.logout().await;
}

#[tokio::test(start_paused = true)]
async fn logout_stops_status_checks() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;
    assert_eq!(client.status_calls(), 2);

    session.logout().await;
    tokio::time::sleep(POLL * 10).await;

    assert_eq!(client.status_calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn dropping_session_stops_status_checks() {
    let client = Arc::new(RecordingClient::with_status(StreamStatus::clear()));
    let session = NotificationSession::login(client.clone(), POLL);
    settle().await;

    drop(session);
    tokio::time::sleep(POLL * 5).await;

    assert_eq!(client.status_calls(), 2);
}
