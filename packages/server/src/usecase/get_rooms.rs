//! UseCase: ルーム情報の参照
//!
//! 運用向けの読み取り専用ビュー（一覧・詳細・統計）。

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::{MessagePusher, ProjectId, Room, RoomRepository};

/// Connection and room counters for `/stats`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayStats {
    pub active_connections: usize,
    /// Room name → member count
    pub rooms: BTreeMap<String, usize>,
}

pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl GetRoomsUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    pub async fn list(&self) -> Vec<Room> {
        self.repository.list_rooms().await
    }

    pub async fn detail(&self, project_id: &ProjectId) -> Option<Room> {
        self.repository.get_room(project_id).await
    }

    pub async fn stats(&self) -> RelayStats {
        let rooms = self
            .repository
            .list_rooms()
            .await
            .iter()
            .map(|room| (room.name(), room.member_count()))
            .collect();
        RelayStats {
            active_connections: self.message_pusher.connection_count().await,
            rooms,
        }
    }
}
