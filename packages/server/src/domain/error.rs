//! Domain error types.

use thiserror::Error;

/// Validation failures when building value objects from raw input
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is too long ({actual} > {max} characters)")]
    TooLong {
        field: &'static str,
        max: usize,
        actual: usize,
    },
}

/// Room registry errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("room '{0}' not found")]
    RoomNotFound(String),
}

/// Errors raised while pushing events to connections
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}

/// Failures talking to the external message store
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    /// Network failure before any response arrived
    #[error("message store unreachable: {0}")]
    Unavailable(String),

    #[error("message store did not answer within {0:?}")]
    Timeout(std::time::Duration),

    /// The store answered but refused the request
    #[error("message store rejected the request: {message}")]
    Rejected {
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("message store returned malformed data: {0}")]
    Malformed(String),
}

impl StoreError {
    /// Short machine readable class of the failure
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Unavailable(_) => "unreachable",
            StoreError::Timeout(_) => "timeout",
            StoreError::Rejected { .. } => "rejected",
            StoreError::Malformed(_) => "malformed",
        }
    }

    /// Structured detail for the client, if the store returned any.
    pub fn details(&self) -> serde_json::Value {
        match self {
            StoreError::Rejected {
                details: Some(details),
                ..
            } => details.clone(),
            other => serde_json::Value::String(other.to_string()),
        }
    }
}
