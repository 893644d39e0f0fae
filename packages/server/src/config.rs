//! Runtime configuration of the relay server.

use std::time::Duration;

use crate::infrastructure::message_store::http::DEFAULT_STORE_TIMEOUT;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_STORE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_CORS_ORIGINS: &[&str] = &["http://localhost:8000", "http://127.0.0.1:8000"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Base URL of the message store service
    pub store_url: String,
    /// Upper bound for every message store call
    pub store_timeout: Duration,
    /// Origins allowed to open connections from a browser
    pub cors_origins: Vec<String>,
    /// Reported by `/health`
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_url: DEFAULT_STORE_URL.to_string(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
            cors_origins: DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect(),
            environment: DEFAULT_ENVIRONMENT.to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Split a comma separated origin list, dropping blanks
pub fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
