//! Domain entities.

use super::value_object::{
    ConnectionId, DisplayName, MessageBody, MessageId, ProjectId, Timestamp, UserId,
};

/// One user's presence in a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub user_id: UserId,
    pub display_name: DisplayName,
    /// Connection currently representing this user in the room
    pub connection_id: ConnectionId,
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(
        user_id: UserId,
        display_name: DisplayName,
        connection_id: ConnectionId,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            user_id,
            display_name,
            connection_id,
            joined_at,
        }
    }
}

/// Project-scoped chat room.
///
/// Members are kept in insertion order and are unique by `user_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: ProjectId,
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: ProjectId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            created_at,
        }
    }

    pub fn name(&self) -> String {
        self.id.room_name()
    }

    /// Insert `member`, or overwrite the entry with the same user id in place.
    ///
    /// Returns the entry that was replaced.
    pub fn upsert_member(&mut self, member: Member) -> Option<Member> {
        match self
            .members
            .iter_mut()
            .find(|m| m.user_id == member.user_id)
        {
            Some(existing) => Some(std::mem::replace(existing, member)),
            None => {
                self.members.push(member);
                None
            }
        }
    }

    pub fn remove_member(&mut self, user_id: &UserId) -> Option<Member> {
        let index = self.members.iter().position(|m| &m.user_id == user_id)?;
        Some(self.members.remove(index))
    }

    pub fn member_count(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            project_id: self.id.clone(),
            members: self.members.clone(),
        }
    }
}

/// Point-in-time view of a room's membership.
///
/// Also used for rooms that do not exist (no members).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub project_id: ProjectId,
    pub members: Vec<Member>,
}

impl RoomSnapshot {
    pub fn empty(project_id: ProjectId) -> Self {
        Self {
            project_id,
            members: Vec::new(),
        }
    }

    pub fn count(&self) -> usize {
        self.members.len()
    }

    pub fn room_name(&self) -> String {
        self.project_id.room_name()
    }

    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.members.iter().map(|m| m.connection_id).collect()
    }
}

/// A chat message on its way to the message store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub project_id: ProjectId,
    pub body: MessageBody,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub author_handle: DisplayName,
}

/// A chat message confirmed by the message store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: MessageId,
    pub project_id: ProjectId,
    pub body: MessageBody,
    pub author_id: UserId,
    pub author_name: DisplayName,
    pub author_handle: DisplayName,
    /// Creation time exactly as reported by the store
    pub created_at: String,
}

impl ChatMessage {
    pub fn confirmed(outgoing: OutgoingMessage, id: MessageId, created_at: String) -> Self {
        Self {
            id,
            project_id: outgoing.project_id,
            body: outgoing.body,
            author_id: outgoing.author_id,
            author_name: outgoing.author_name,
            author_handle: outgoing.author_handle,
            created_at,
        }
    }
}
