//! Validated requests coming from a connection.

use super::{DisplayName, ProjectId, UserId};

/// `join_room` / `rejoin_room`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub project_id: ProjectId,
    pub user_id: UserId,
    pub display_name: DisplayName,
}

/// `leave_room`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    pub project_id: ProjectId,
    pub user_id: UserId,
}
