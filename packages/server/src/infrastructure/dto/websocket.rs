//! WebSocket frame DTOs.
//!
//! Every frame is a JSON text message of the form
//! `{"event": "<name>", "data": {...}}`.

use serde::{Deserialize, Serialize};

use crate::domain::MessageId;

// ========================================
// Inbound
// ========================================

/// Identifier that clients may send either as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum WireId {
    Number(i64),
    Text(String),
}

impl WireId {
    pub fn into_string(self) -> String {
        match self {
            WireId::Number(n) => n.to_string(),
            WireId::Text(s) => s,
        }
    }
}

/// Raw envelope, parsed before the payload so errors can name the event
#[derive(Debug, Deserialize)]
pub struct InboundFrame {
    pub event: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct JoinRoomPayload {
    pub project_id: WireId,
    pub user_id: WireId,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeaveRoomPayload {
    pub project_id: WireId,
    pub user_id: WireId,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SendMessagePayload {
    pub project_id: WireId,
    pub body: String,
    pub user_id: WireId,
    pub username: String,
    /// Falls back to `username` when absent or blank
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectPayload {
    pub project_id: WireId,
}

/// Typed inbound event
#[derive(Debug, Clone)]
pub enum InboundEvent {
    JoinRoom(JoinRoomPayload),
    RejoinRoom(JoinRoomPayload),
    LeaveRoom(LeaveRoomPayload),
    SendMessage(SendMessagePayload),
    RequestRoomSnapshot(ProjectPayload),
    RequestHistory(ProjectPayload),
    Keepalive,
}

/// Why an inbound frame could not be decoded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundDecodeError {
    /// Event name, or `unknown` if the envelope itself was unreadable
    pub event: String,
    pub message: String,
}

impl InboundEvent {
    pub fn parse(text: &str) -> Result<Self, InboundDecodeError> {
        let frame: InboundFrame =
            serde_json::from_str(text).map_err(|e| InboundDecodeError {
                event: "unknown".to_string(),
                message: format!("malformed frame: {}", e),
            })?;
        Self::from_frame(frame)
    }

    pub fn from_frame(frame: InboundFrame) -> Result<Self, InboundDecodeError> {
        fn payload<T: for<'de> Deserialize<'de>>(
            event: &str,
            data: serde_json::Value,
        ) -> Result<T, InboundDecodeError> {
            serde_json::from_value(data).map_err(|e| InboundDecodeError {
                event: event.to_string(),
                message: format!("invalid payload: {}", e),
            })
        }

        let InboundFrame { event, data } = frame;
        match event.as_str() {
            "join_room" => payload(&event, data).map(InboundEvent::JoinRoom),
            "rejoin_room" => payload(&event, data).map(InboundEvent::RejoinRoom),
            "leave_room" => payload(&event, data).map(InboundEvent::LeaveRoom),
            "send_message" => payload(&event, data).map(InboundEvent::SendMessage),
            "request_room_snapshot" => {
                payload(&event, data).map(InboundEvent::RequestRoomSnapshot)
            }
            "request_history" => payload(&event, data).map(InboundEvent::RequestHistory),
            "keepalive" => Ok(InboundEvent::Keepalive),
            _ => Err(InboundDecodeError {
                message: format!("unknown event '{}'", event),
                event,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            InboundEvent::JoinRoom(_) => "join_room",
            InboundEvent::RejoinRoom(_) => "rejoin_room",
            InboundEvent::LeaveRoom(_) => "leave_room",
            InboundEvent::SendMessage(_) => "send_message",
            InboundEvent::RequestRoomSnapshot(_) => "request_room_snapshot",
            InboundEvent::RequestHistory(_) => "request_history",
            InboundEvent::Keepalive => "keepalive",
        }
    }
}

// ========================================
// Outbound
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDto {
    pub user_id: String,
    pub display_name: String,
    /// RFC 3339
    pub joined_at: String,
}

/// Payload of `membership_update` and `room_snapshot_response`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomMembershipDto {
    pub count: usize,
    pub room: String,
    pub project_id: String,
    pub members: Vec<MemberDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageDeliveredDto {
    pub id: MessageId,
    pub body: String,
    pub author_id: String,
    pub author_name: String,
    pub author_handle: String,
    pub created_at: String,
    pub project_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistorySnapshotDto {
    pub project_id: String,
    pub messages: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    pub message: String,
    pub details: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomResetDto {
    pub room: String,
    pub project_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidPayloadDto {
    pub event: String,
    pub message: String,
}

/// Every frame the relay sends
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundEvent {
    MembershipUpdate(RoomMembershipDto),
    RoomSnapshotResponse(RoomMembershipDto),
    MessageDelivered(MessageDeliveredDto),
    HistorySnapshot(HistorySnapshotDto),
    HistoryUnavailable(FailureDto),
    RelayFailed(FailureDto),
    RoomReset(RoomResetDto),
    InvalidPayload(InvalidPayloadDto),
    KeepaliveAck,
}
