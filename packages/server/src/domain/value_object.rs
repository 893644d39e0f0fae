//! Value objects.
//!
//! Raw strings coming off the wire are validated here once; everything past
//! the UI layer works with these types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ValueObjectError;

const PROJECT_ID_MAX_LEN: usize = 128;
const USER_ID_MAX_LEN: usize = 128;
const DISPLAY_NAME_MAX_LEN: usize = 150;
const MESSAGE_BODY_MAX_LEN: usize = 10_000;

/// Trims surrounding whitespace, then checks emptiness and length.
fn trimmed(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValueObjectError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    let actual = trimmed.chars().count();
    if actual > max {
        return Err(ValueObjectError::TooLong { field, max, actual });
    }
    if trimmed.len() == value.len() {
        Ok(value)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Keeps the value byte for byte; only a whitespace-only value is empty.
fn verbatim(
    field: &'static str,
    value: String,
    max: usize,
) -> Result<String, ValueObjectError> {
    if value.trim().is_empty() {
        return Err(ValueObjectError::Empty { field });
    }
    let actual = value.chars().count();
    if actual > max {
        return Err(ValueObjectError::TooLong { field, max, actual });
    }
    Ok(value)
}

macro_rules! string_value_object {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr, $validate:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(value: String) -> Result<Self, ValueObjectError> {
                $validate($field, value, $max).map(Self)
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValueObjectError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_value_object!(
    /// Project identifier; also the key of the project's room
    ProjectId,
    "project_id",
    PROJECT_ID_MAX_LEN,
    trimmed
);

string_value_object!(
    /// Stable account identifier of a user
    UserId,
    "user_id",
    USER_ID_MAX_LEN,
    trimmed
);

string_value_object!(
    /// Human readable name shown to other members
    DisplayName,
    "display_name",
    DISPLAY_NAME_MAX_LEN,
    trimmed
);

string_value_object!(
    /// Chat text as typed; surrounding whitespace is part of the message
    MessageBody,
    "body",
    MESSAGE_BODY_MAX_LEN,
    verbatim
);

impl ProjectId {
    /// Name of the broadcast room for this project (`project_{id}`)
    pub fn room_name(&self) -> String {
        format!("project_{}", self.0)
    }
}

/// Identifier of one live transport connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ConnectionId(uuid::Uuid);

impl ConnectionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Message id assigned by the message store.
///
/// The store may use integer or string keys; the original representation is
/// kept so clients see exactly what the store returned.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageId {
    Number(i64),
    Text(String),
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageId::Number(n) => write!(f, "{}", n),
            MessageId::Text(s) => f.write_str(s),
        }
    }
}

/// Unix timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}
