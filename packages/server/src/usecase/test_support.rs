//! Shared fixtures for use case tests.

use std::sync::Arc;
use std::time::Duration;

use chatrelay_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::domain::{
    ConnectionId, ConnectionSession, DisplayName, JoinRequest, LeaveRequest, MessageBody,
    MessagePusher, OutgoingMessage, ProjectId, RoomRepository, Timestamp, UserId,
};
use crate::infrastructure::{InMemoryRoomRepository, WebSocketMessagePusher};

use super::MembershipController;

pub(crate) const NOW: i64 = 1_672_531_200_000;

pub(crate) struct Harness {
    pub repository: Arc<dyn RoomRepository>,
    pub pusher: Arc<dyn MessagePusher>,
    pub clock: Arc<FixedClock>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            repository: Arc::new(InMemoryRoomRepository::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
            clock: Arc::new(FixedClock::new(NOW)),
        }
    }

    pub fn membership(&self) -> MembershipController {
        MembershipController::new(
            self.repository.clone(),
            self.pusher.clone(),
            self.clock.clone(),
        )
    }

    /// Register a fresh connection and return its session and outbound queue
    pub async fn connect(&self) -> (ConnectionSession, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = ConnectionId::generate();
        self.pusher.register_client(connection_id, tx).await;
        (
            ConnectionSession::new(connection_id, Timestamp::new(NOW)),
            rx,
        )
    }

    /// Next frame as JSON; panics if nothing arrives within a second
    pub async fn next_event(rx: &mut mpsc::UnboundedReceiver<String>) -> serde_json::Value {
        let text = tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no frame within 1s")
            .expect("channel closed");
        serde_json::from_str(&text).expect("frame is not JSON")
    }

    pub fn no_event(rx: &mut mpsc::UnboundedReceiver<String>) -> bool {
        rx.try_recv().is_err()
    }

    pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) {
        while rx.try_recv().is_ok() {}
    }
}

pub(crate) fn project(id: &str) -> ProjectId {
    ProjectId::new(id.to_string()).unwrap()
}

pub(crate) fn user(id: &str) -> UserId {
    UserId::new(id.to_string()).unwrap()
}

pub(crate) fn join_request(project_id: &str, user_id: &str, name: &str) -> JoinRequest {
    JoinRequest {
        project_id: project(project_id),
        user_id: user(user_id),
        display_name: DisplayName::new(name.to_string()).unwrap(),
    }
}

pub(crate) fn leave_request(project_id: &str, user_id: &str) -> LeaveRequest {
    LeaveRequest {
        project_id: project(project_id),
        user_id: user(user_id),
    }
}

pub(crate) fn outgoing(project_id: &str, user_id: &str, body: &str) -> OutgoingMessage {
    OutgoingMessage {
        project_id: project(project_id),
        body: MessageBody::new(body.to_string()).unwrap(),
        author_id: user(user_id),
        author_name: DisplayName::new(user_id.to_uppercase()).unwrap(),
        author_handle: DisplayName::new(user_id.to_string()).unwrap(),
    }
}
