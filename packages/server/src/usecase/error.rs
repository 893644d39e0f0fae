//! UseCase errors.

use thiserror::Error;

use crate::domain::{MessagePushError, RepositoryError, StoreError};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MembershipError {
    #[error("room registry error: {0}")]
    Registry(#[from] RepositoryError),
}

/// Why a chat message was not delivered to the room
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelayError {
    #[error("failed to persist message: {0}")]
    Store(#[from] StoreError),

    #[error("failed to broadcast message: {0}")]
    Broadcast(#[from] MessagePushError),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum HistoryError {
    #[error("failed to fetch history: {0}")]
    Store(#[from] StoreError),

    #[error("failed to deliver history: {0}")]
    Push(#[from] MessagePushError),
}
