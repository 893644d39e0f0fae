//! In-memory implementations.

mod room;

pub use room::InMemoryRoomRepository;
