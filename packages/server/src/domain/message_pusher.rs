//! Event delivery port.
//!
//! ## 責務
//!
//! - 接続ごとの送信チャンネルの登録・解除
//! - 単一接続への送信（push_to）と複数接続への送信（broadcast）
//!
//! Events are domain values; encoding them for the wire is the implementor's job.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatMessage, ConnectionId, MessagePushError, ProjectId, RoomSnapshot};

/// Channel carrying encoded frames to one connection's socket writer
pub type PusherChannel = mpsc::UnboundedSender<String>;

/// Everything the relay can send to a connection
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// Membership of a room changed
    MembershipUpdate(RoomSnapshot),
    /// Reply to an explicit snapshot request
    RoomSnapshotResponse(RoomSnapshot),
    MessageDelivered(ChatMessage),
    HistorySnapshot {
        project_id: ProjectId,
        messages: Vec<serde_json::Value>,
    },
    HistoryUnavailable {
        project_id: ProjectId,
        message: String,
        details: serde_json::Value,
    },
    RelayFailed {
        message: String,
        details: serde_json::Value,
    },
    /// The room was force-cleared by an operator
    RoomReset {
        project_id: ProjectId,
        reason: String,
    },
    InvalidPayload {
        event: String,
        message: String,
    },
    KeepaliveAck,
}

/// Pushes events to live connections
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a newly opened connection
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Send one event to one connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        event: &PushEvent,
    ) -> Result<(), MessagePushError>;

    /// Send one event to every target.
    ///
    /// Unknown or closed targets are skipped; the event is delivered to the
    /// remaining targets before any other broadcast is processed.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        event: &PushEvent,
    ) -> Result<(), MessagePushError>;

    /// Number of registered connections
    async fn connection_count(&self) -> usize;
}
