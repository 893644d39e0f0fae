//! Request handlers.

mod http;
mod websocket;

pub use http::{
    clear_room, clear_rooms, get_room_detail, get_rooms, get_stats, health_check, test_store,
};
pub use websocket::websocket_handler;
