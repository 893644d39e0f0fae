//! UseCase layer.
//!
//! Each use case receives its collaborators (registry, pusher, store) as
//! trait objects so that tests can swap them out.

mod check_store;
mod connect_client;
mod disconnect_client;
mod error;
mod fetch_history;
mod get_rooms;
mod membership;
mod send_message;

pub use check_store::CheckMessageStoreUseCase;
pub use connect_client::ConnectClientUseCase;
pub use disconnect_client::DisconnectClientUseCase;
pub use error::{HistoryError, MembershipError, RelayError};
pub use fetch_history::FetchHistoryUseCase;
pub use get_rooms::{GetRoomsUseCase, RelayStats};
pub use membership::MembershipController;
pub use send_message::SendMessageUseCase;

#[cfg(test)]
pub(crate) mod test_support;
