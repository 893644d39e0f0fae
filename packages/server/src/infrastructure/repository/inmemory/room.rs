//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! プロジェクト ID をキーにした HashMap をインメモリのルーム表として使用します。
//! 表全体を1つの Mutex で保護するため、操作はすべて直列化されます。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Member, ProjectId, RepositoryError, Room, RoomRepository, Timestamp, UserId};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<HashMap<ProjectId, Room>>,
}

impl InMemoryRoomRepository {
    /// 空のルーム表で InMemoryRoomRepository を作成
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn ensure_room(&self, project_id: &ProjectId, created_at: Timestamp) -> Room {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(project_id.clone())
            .or_insert_with(|| {
                tracing::debug!("Room '{}' created", project_id.room_name());
                Room::new(project_id.clone(), created_at)
            })
            .clone()
    }

    async fn upsert_member(
        &self,
        project_id: &ProjectId,
        member: Member,
    ) -> Result<Option<Member>, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(project_id)
            .ok_or_else(|| RepositoryError::RoomNotFound(project_id.as_str().to_string()))?;
        Ok(room.upsert_member(member))
    }

    async fn remove_member(&self, project_id: &ProjectId, user_id: &UserId) -> Option<Member> {
        let mut rooms = self.rooms.lock().await;
        rooms.get_mut(project_id)?.remove_member(user_id)
    }

    async fn member_count(&self, project_id: &ProjectId) -> usize {
        let rooms = self.rooms.lock().await;
        rooms.get(project_id).map_or(0, Room::member_count)
    }

    async fn members(&self, project_id: &ProjectId) -> Vec<Member> {
        let rooms = self.rooms.lock().await;
        rooms
            .get(project_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    async fn delete_if_empty(&self, project_id: &ProjectId) -> bool {
        let mut rooms = self.rooms.lock().await;
        match rooms.get(project_id) {
            Some(room) if room.is_empty() => {
                rooms.remove(project_id);
                tracing::debug!("Room '{}' deleted (empty)", project_id.room_name());
                true
            }
            _ => false,
        }
    }

    async fn get_room(&self, project_id: &ProjectId) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(project_id).cloned()
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        let mut list: Vec<Room> = rooms.values().cloned().collect();
        list.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        list
    }

    async fn clear_room(&self, project_id: &ProjectId) -> Option<Room> {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(project_id)
    }

    async fn clear_all(&self) -> Vec<Room> {
        let mut rooms = self.rooms.lock().await;
        let mut cleared: Vec<Room> = rooms.drain().map(|(_, room)| room).collect();
        cleared.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        cleared
    }
}
