//! Presence and message relay for project-scoped chat rooms.
//!
//! Connections join the room of a project, see who else is in it, and
//! exchange messages that are persisted by an external message store before
//! they are broadcast.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
