//! Conversion logic between DTOs and domain values.

use chatrelay_shared::time::timestamp_to_rfc3339;

use crate::domain::{
    ChatMessage, DisplayName, JoinRequest, LeaveRequest, Member, MessageBody, OutgoingMessage,
    ProjectId, PushEvent, Room, RoomSnapshot, UserId, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::WireId> for ProjectId {
    type Error = ValueObjectError;

    fn try_from(id: dto::WireId) -> Result<Self, Self::Error> {
        ProjectId::new(id.into_string())
    }
}

impl TryFrom<dto::WireId> for UserId {
    type Error = ValueObjectError;

    fn try_from(id: dto::WireId) -> Result<Self, Self::Error> {
        UserId::new(id.into_string())
    }
}

impl TryFrom<dto::JoinRoomPayload> for JoinRequest {
    type Error = ValueObjectError;

    fn try_from(payload: dto::JoinRoomPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: payload.project_id.try_into()?,
            user_id: payload.user_id.try_into()?,
            display_name: DisplayName::new(payload.username)?,
        })
    }
}

impl TryFrom<dto::LeaveRoomPayload> for LeaveRequest {
    type Error = ValueObjectError;

    fn try_from(payload: dto::LeaveRoomPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            project_id: payload.project_id.try_into()?,
            user_id: payload.user_id.try_into()?,
        })
    }
}

impl TryFrom<dto::SendMessagePayload> for OutgoingMessage {
    type Error = ValueObjectError;

    fn try_from(payload: dto::SendMessagePayload) -> Result<Self, Self::Error> {
        let author_handle = DisplayName::new(payload.username)?;
        let author_name = match payload.display_name {
            Some(name) if !name.trim().is_empty() => DisplayName::new(name)?,
            _ => author_handle.clone(),
        };
        Ok(Self {
            project_id: payload.project_id.try_into()?,
            body: MessageBody::new(payload.body)?,
            author_id: payload.user_id.try_into()?,
            author_name,
            author_handle,
        })
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<&Member> for dto::MemberDto {
    fn from(member: &Member) -> Self {
        Self {
            user_id: member.user_id.as_str().to_string(),
            display_name: member.display_name.as_str().to_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        }
    }
}

impl From<&RoomSnapshot> for dto::RoomMembershipDto {
    fn from(snapshot: &RoomSnapshot) -> Self {
        Self {
            count: snapshot.count(),
            room: snapshot.room_name(),
            project_id: snapshot.project_id.as_str().to_string(),
            members: snapshot.members.iter().map(Into::into).collect(),
        }
    }
}

impl From<&ChatMessage> for dto::MessageDeliveredDto {
    fn from(message: &ChatMessage) -> Self {
        Self {
            id: message.id.clone(),
            body: message.body.as_str().to_string(),
            author_id: message.author_id.as_str().to_string(),
            author_name: message.author_name.as_str().to_string(),
            author_handle: message.author_handle.as_str().to_string(),
            created_at: message.created_at.clone(),
            project_id: message.project_id.as_str().to_string(),
        }
    }
}

impl From<&PushEvent> for dto::OutboundEvent {
    fn from(event: &PushEvent) -> Self {
        match event {
            PushEvent::MembershipUpdate(snapshot) => Self::MembershipUpdate(snapshot.into()),
            PushEvent::RoomSnapshotResponse(snapshot) => {
                Self::RoomSnapshotResponse(snapshot.into())
            }
            PushEvent::MessageDelivered(message) => Self::MessageDelivered(message.into()),
            PushEvent::HistorySnapshot {
                project_id,
                messages,
            } => Self::HistorySnapshot(dto::HistorySnapshotDto {
                project_id: project_id.as_str().to_string(),
                messages: messages.clone(),
            }),
            PushEvent::HistoryUnavailable {
                project_id,
                message,
                details,
            } => Self::HistoryUnavailable(dto::FailureDto {
                project_id: Some(project_id.as_str().to_string()),
                message: message.clone(),
                details: details.clone(),
            }),
            PushEvent::RelayFailed { message, details } => Self::RelayFailed(dto::FailureDto {
                project_id: None,
                message: message.clone(),
                details: details.clone(),
            }),
            PushEvent::RoomReset { project_id, reason } => Self::RoomReset(dto::RoomResetDto {
                room: project_id.room_name(),
                project_id: project_id.as_str().to_string(),
                reason: reason.clone(),
            }),
            PushEvent::InvalidPayload { event, message } => {
                Self::InvalidPayload(dto::InvalidPayloadDto {
                    event: event.clone(),
                    message: message.clone(),
                })
            }
            PushEvent::KeepaliveAck => Self::KeepaliveAck,
        }
    }
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            room: room.name(),
            count: room.member_count(),
            members: room
                .members
                .iter()
                .map(|m| m.user_id.as_str().to_string())
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            id: room.id.as_str().to_string(),
            room: room.name(),
            count: room.member_count(),
            members: room.members.iter().map(Into::into).collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}
