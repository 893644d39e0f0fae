//! UseCase: ルームメンバーシップ管理
//!
//! join / rejoin / leave / disconnect の状態遷移をルーム表に適用し、
//! 変更後のメンバー一覧をルームへブロードキャストする。
//!
//! ## 直列化
//!
//! ルーム表の変更とそのブロードキャストは `membership_lock` の内側で行う。
//! これにより、同じルームの membership_update は変更が適用された順に
//! 全購読者へ届く。ルーム表を変更するのはこのコントローラだけである。

use std::sync::Arc;

use chatrelay_shared::time::Clock;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionSession, JoinRequest, LeaveRequest, Member, MessagePusher, ProjectId,
    PushEvent, Room, RoomRepository, RoomSnapshot, Timestamp, UserId,
};

use super::error::MembershipError;

/// Membership controller
pub struct MembershipController {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
    membership_lock: Mutex<()>,
}

impl MembershipController {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
            membership_lock: Mutex::new(()),
        }
    }

    /// Join a room (or move to it from the session's current room).
    ///
    /// Returns the membership of the joined room as broadcast to its members.
    pub async fn join(
        &self,
        session: &mut ConnectionSession,
        request: JoinRequest,
    ) -> Result<RoomSnapshot, MembershipError> {
        let _guard = self.membership_lock.lock().await;
        let connection_id = session.connection_id();

        // implicit leave of a different binding
        let same_binding = session.is_bound_to(&request.project_id)
            && session.user_id() == Some(&request.user_id);
        if !same_binding && let Some((old_room, old_user)) = session.unbind() {
            tracing::info!(
                "Connection '{}' moves from '{}' to '{}'",
                connection_id,
                old_room.room_name(),
                request.project_id.room_name()
            );
            self.remove_if_owned(&old_room, &old_user, connection_id)
                .await;
        }

        let now = Timestamp::new(self.clock.now_millis());
        self.repository.ensure_room(&request.project_id, now).await;

        let member = Member::new(
            request.user_id.clone(),
            request.display_name,
            connection_id,
            now,
        );
        let replaced = self
            .repository
            .upsert_member(&request.project_id, member)
            .await?;
        if let Some(previous) = replaced
            && previous.connection_id != connection_id
        {
            tracing::info!(
                "User '{}' in '{}' now represented by connection '{}' (was '{}')",
                request.user_id,
                request.project_id.room_name(),
                connection_id,
                previous.connection_id
            );
        }

        session.bind(request.project_id.clone(), request.user_id.clone());

        let snapshot = RoomSnapshot {
            members: self.repository.members(&request.project_id).await,
            project_id: request.project_id,
        };
        tracing::info!(
            "User '{}' joined '{}' ({} online)",
            request.user_id,
            snapshot.room_name(),
            snapshot.count()
        );
        self.announce(snapshot.connection_ids(), &snapshot).await;

        Ok(snapshot)
    }

    /// Restore membership after a reconnect; same upsert semantics as `join`.
    pub async fn rejoin(
        &self,
        session: &mut ConnectionSession,
        request: JoinRequest,
    ) -> Result<RoomSnapshot, MembershipError> {
        tracing::debug!(
            "Rejoin of '{}' to '{}' on connection '{}'",
            request.user_id,
            request.project_id.room_name(),
            session.connection_id()
        );
        self.join(session, request).await
    }

    /// Explicit leave.
    ///
    /// The leaving connection receives the final membership update. The
    /// session is detached only when the request names its own binding, so a
    /// leave for another user keeps this connection's member cleanable on
    /// disconnect. Returns `None` when the user was not a member.
    pub async fn leave(
        &self,
        session: &mut ConnectionSession,
        request: LeaveRequest,
    ) -> Option<RoomSnapshot> {
        let _guard = self.membership_lock.lock().await;

        if session.is_bound_to(&request.project_id)
            && session.user_id() == Some(&request.user_id)
        {
            session.unbind();
        }

        let snapshot = self
            .remove_and_announce(
                &request.project_id,
                &request.user_id,
                Some(session.connection_id()),
            )
            .await;
        if snapshot.is_none() {
            tracing::debug!(
                "Leave of '{}' from '{}' ignored: not a member",
                request.user_id,
                request.project_id.room_name()
            );
        }
        snapshot
    }

    /// Cleanup for a closed connection.
    ///
    /// No-op for an unbound session, for a member that already left, and for
    /// a member that is now represented by another connection.
    pub async fn disconnect(&self, session: &mut ConnectionSession) -> Option<RoomSnapshot> {
        let (project_id, user_id) = session.unbind()?;
        let _guard = self.membership_lock.lock().await;
        self.remove_if_owned(&project_id, &user_id, session.connection_id())
            .await
    }

    /// Read-only membership of a room, delivered to the requester only.
    pub async fn snapshot(&self, requester: ConnectionId, project_id: ProjectId) -> RoomSnapshot {
        let members = self.repository.members(&project_id).await;
        let snapshot = RoomSnapshot {
            project_id,
            members,
        };
        if let Err(e) = self
            .message_pusher
            .push_to(
                &requester,
                &PushEvent::RoomSnapshotResponse(snapshot.clone()),
            )
            .await
        {
            tracing::warn!("Failed to send room snapshot to '{}': {}", requester, e);
        }
        snapshot
    }

    /// Force-clear one room; its members receive `room_reset`.
    pub async fn clear_room(&self, project_id: &ProjectId, reason: &str) -> Option<Room> {
        let _guard = self.membership_lock.lock().await;
        let room = self.repository.clear_room(project_id).await?;
        self.notify_reset(&room, reason).await;
        Some(room)
    }

    /// Force-clear every room.
    pub async fn clear_all(&self, reason: &str) -> Vec<Room> {
        let _guard = self.membership_lock.lock().await;
        let rooms = self.repository.clear_all().await;
        for room in &rooms {
            self.notify_reset(room, reason).await;
        }
        rooms
    }

    /// Remove `user_id` only while `connection_id` still represents it.
    /// Caller holds `membership_lock`.
    async fn remove_if_owned(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        connection_id: ConnectionId,
    ) -> Option<RoomSnapshot> {
        let owned = self
            .repository
            .members(project_id)
            .await
            .iter()
            .any(|m| &m.user_id == user_id && m.connection_id == connection_id);
        if !owned {
            tracing::debug!(
                "Connection '{}' no longer represents '{}' in '{}'",
                connection_id,
                user_id,
                project_id.room_name()
            );
            return None;
        }
        self.remove_and_announce(project_id, user_id, None).await
    }

    /// Remove a member, broadcast the new membership and drop the room if it
    /// became empty. Caller holds `membership_lock`.
    async fn remove_and_announce(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        leaver: Option<ConnectionId>,
    ) -> Option<RoomSnapshot> {
        let removed = self.repository.remove_member(project_id, user_id).await?;

        let snapshot = RoomSnapshot {
            project_id: project_id.clone(),
            members: self.repository.members(project_id).await,
        };
        tracing::info!(
            "User '{}' left '{}' ({} online)",
            removed.user_id,
            snapshot.room_name(),
            snapshot.count()
        );

        if self.repository.delete_if_empty(project_id).await {
            tracing::info!("Room '{}' deleted", snapshot.room_name());
        }

        let mut targets = snapshot.connection_ids();
        if let Some(leaver) = leaver
            && !targets.contains(&leaver)
        {
            targets.push(leaver);
        }
        self.announce(targets, &snapshot).await;

        Some(snapshot)
    }

    async fn announce(&self, targets: Vec<ConnectionId>, snapshot: &RoomSnapshot) {
        if let Err(e) = self
            .message_pusher
            .broadcast(targets, &PushEvent::MembershipUpdate(snapshot.clone()))
            .await
        {
            tracing::warn!(
                "Failed to broadcast membership of '{}': {}",
                snapshot.room_name(),
                e
            );
        }
    }

    async fn notify_reset(&self, room: &Room, reason: &str) {
        tracing::warn!(
            "Room '{}' cleared ({} members): {}",
            room.name(),
            room.member_count(),
            reason
        );
        let event = PushEvent::RoomReset {
            project_id: room.id.clone(),
            reason: reason.to_string(),
        };
        if let Err(e) = self
            .message_pusher
            .broadcast(room.connection_ids(), &event)
            .await
        {
            tracing::warn!("Failed to notify reset of '{}': {}", room.name(), e);
        }
    }
}
