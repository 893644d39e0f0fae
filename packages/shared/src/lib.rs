//! Shared utilities for the chatrelay workspace.

pub mod logger;
pub mod time;
