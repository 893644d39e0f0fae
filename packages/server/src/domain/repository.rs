//! Room registry port.
//!
//! The use cases depend on this trait; the infrastructure layer provides the
//! in-memory implementation.

use async_trait::async_trait;

use super::{Member, ProjectId, RepositoryError, Room, Timestamp, UserId};

/// Registry of live rooms keyed by project id.
///
/// Implementations only mutate their own table; they never emit events.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Return the room for `project_id`, creating it (empty) if needed.
    async fn ensure_room(&self, project_id: &ProjectId, created_at: Timestamp) -> Room;

    /// Insert or overwrite the member keyed by its user id.
    ///
    /// Returns the replaced entry, if any.
    async fn upsert_member(
        &self,
        project_id: &ProjectId,
        member: Member,
    ) -> Result<Option<Member>, RepositoryError>;

    /// Remove a member; `None` if the room or the member is absent.
    async fn remove_member(&self, project_id: &ProjectId, user_id: &UserId) -> Option<Member>;

    /// Number of members (0 for an absent room)
    async fn member_count(&self, project_id: &ProjectId) -> usize;

    /// Members in insertion order (empty for an absent room)
    async fn members(&self, project_id: &ProjectId) -> Vec<Member>;

    /// Drop the room if it has no members; returns whether it was removed.
    async fn delete_if_empty(&self, project_id: &ProjectId) -> bool;

    async fn get_room(&self, project_id: &ProjectId) -> Option<Room>;

    async fn list_rooms(&self) -> Vec<Room>;

    /// Remove a room regardless of its members.
    async fn clear_room(&self, project_id: &ProjectId) -> Option<Room>;

    /// Remove every room.
    async fn clear_all(&self) -> Vec<Room>;
}
