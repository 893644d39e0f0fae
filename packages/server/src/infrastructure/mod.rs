//! Infrastructure layer: concrete implementations of the domain ports and
//! the wire DTOs.

pub mod dto;
pub mod message_pusher;
pub mod message_store;
pub mod repository;

pub use message_pusher::WebSocketMessagePusher;
pub use message_store::HttpMessageStore;
pub use repository::InMemoryRoomRepository;
