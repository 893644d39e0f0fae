//! Per-connection session state.

use super::value_object::{ConnectionId, ProjectId, Timestamp, UserId};

/// Which room, if any, a connection currently belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Unbound,
    Bound { project_id: ProjectId, user_id: UserId },
}

/// Transient state of one live connection.
///
/// Holds ids only; the room registry owns the actual membership.
#[derive(Debug, Clone)]
pub struct ConnectionSession {
    connection_id: ConnectionId,
    connected_at: Timestamp,
    state: SessionState,
}

impl ConnectionSession {
    pub fn new(connection_id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            connection_id,
            connected_at,
            state: SessionState::Unbound,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn connected_at(&self) -> Timestamp {
        self.connected_at
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_bound(&self) -> bool {
        matches!(self.state, SessionState::Bound { .. })
    }

    pub fn current_room(&self) -> Option<&ProjectId> {
        match &self.state {
            SessionState::Bound { project_id, .. } => Some(project_id),
            SessionState::Unbound => None,
        }
    }

    pub fn user_id(&self) -> Option<&UserId> {
        match &self.state {
            SessionState::Bound { user_id, .. } => Some(user_id),
            SessionState::Unbound => None,
        }
    }

    pub fn is_bound_to(&self, project_id: &ProjectId) -> bool {
        self.current_room() == Some(project_id)
    }

    /// Bind to a room, returning the previous binding if there was one.
    pub fn bind(&mut self, project_id: ProjectId, user_id: UserId) -> Option<(ProjectId, UserId)> {
        match std::mem::replace(&mut self.state, SessionState::Bound { project_id, user_id }) {
            SessionState::Bound {
                project_id,
                user_id,
            } => Some((project_id, user_id)),
            SessionState::Unbound => None,
        }
    }

    pub fn unbind(&mut self) -> Option<(ProjectId, UserId)> {
        match std::mem::replace(&mut self.state, SessionState::Unbound) {
            SessionState::Bound {
                project_id,
                user_id,
            } => Some((project_id, user_id)),
            SessionState::Unbound => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(project: &str, user: &str) -> (ProjectId, UserId) {
        (
            ProjectId::new(project.to_string()).unwrap(),
            UserId::new(user.to_string()).unwrap(),
        )
    }

    #[test]
    fn test_new_session_is_unbound() {
        // テスト項目: 新しいセッションはどのルームにも属さない
        // given (前提条件):
        let session = ConnectionSession::new(ConnectionId::generate(), Timestamp::new(0));

        // when (操作):
        let state = session.state();

        // then (期待する結果):
        assert_eq!(state, &SessionState::Unbound);
        assert!(session.current_room().is_none());
        assert!(session.user_id().is_none());
    }

    #[test]
    fn test_bind_returns_previous_binding() {
        // テスト項目: 再バインド時に以前のバインドが返される
        // given (前提条件):
        let mut session = ConnectionSession::new(ConnectionId::generate(), Timestamp::new(0));
        let (room_a, alice) = ids("1", "alice");
        let (room_b, _) = ids("2", "alice");

        // when (操作):
        let first = session.bind(room_a.clone(), alice.clone());
        let second = session.bind(room_b.clone(), alice.clone());

        // then (期待する結果):
        assert!(first.is_none());
        assert_eq!(second, Some((room_a, alice)));
        assert!(session.is_bound_to(&room_b));
    }

    #[test]
    fn test_unbind_is_idempotent() {
        // テスト項目: unbind を2回呼んでも2回目は None
        // given (前提条件):
        let mut session = ConnectionSession::new(ConnectionId::generate(), Timestamp::new(0));
        let (room, alice) = ids("7", "alice");
        session.bind(room, alice);

        // when (操作):
        let first = session.unbind();
        let second = session.unbind();

        // then (期待する結果):
        assert!(first.is_some());
        assert!(second.is_none());
        assert!(!session.is_bound());
    }
}
