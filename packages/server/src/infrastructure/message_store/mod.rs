//! Message store clients.

pub mod http;

pub use http::HttpMessageStore;
