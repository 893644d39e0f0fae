//! Message store port (the external persistence service).

use async_trait::async_trait;

use super::{MessageId, OutgoingMessage, ProjectId, StoreError};

/// Ordered history as returned by the store; entries are passed through opaquely
pub type MessageHistory = Vec<serde_json::Value>;

/// Confirmation returned by the store for a saved message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedMessage {
    pub message_id: MessageId,
    pub created_at: String,
}

/// External message persistence.
///
/// Every call is bounded by the implementation's timeout and is attempted at
/// most once.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn fetch_history(&self, project_id: &ProjectId) -> Result<MessageHistory, StoreError>;

    async fn save_message(&self, message: &OutgoingMessage) -> Result<SavedMessage, StoreError>;

    /// Probe the store; returns whatever the store answered.
    async fn health_check(&self) -> Result<serde_json::Value, StoreError>;
}
