//! Domain layer: rooms, members, sessions and the ports the use cases depend on.
//!
//! Nothing in here performs I/O. `RoomRepository`, `MessagePusher` and
//! `MessageStore` are implemented by the infrastructure layer.

pub mod command;
pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod message_store;
pub mod repository;
pub mod session;
pub mod value_object;

pub use command::{JoinRequest, LeaveRequest};
pub use entity::{ChatMessage, Member, OutgoingMessage, Room, RoomSnapshot};
pub use error::{MessagePushError, RepositoryError, StoreError, ValueObjectError};
pub use message_pusher::{MessagePusher, PushEvent, PusherChannel};
pub use message_store::{MessageHistory, MessageStore, SavedMessage};
#[cfg(test)]
pub use message_store::MockMessageStore;
pub use repository::RoomRepository;
pub use session::{ConnectionSession, SessionState};
pub use value_object::{
    ConnectionId, DisplayName, MessageBody, MessageId, ProjectId, Timestamp, UserId,
};
