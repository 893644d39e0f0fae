//! UI layer: Axum routes for the WebSocket relay and the HTTP surface.

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
