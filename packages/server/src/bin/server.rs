//! Chat relay server.
//!
//! Tracks who is present in each project room over WebSocket and relays chat
//! messages through the message store.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin chatrelay-server
//! cargo run --bin chatrelay-server -- --host 0.0.0.0 --port 3000 --store-url http://127.0.0.1:8000
//! ```

use std::{sync::Arc, time::Duration};

use chatrelay_server::{
    config::{self, ServerConfig},
    infrastructure::{HttpMessageStore, InMemoryRoomRepository, WebSocketMessagePusher},
    ui::{AppState, Server},
};
use chatrelay_shared::{logger::setup_logger, time::SystemClock};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatrelay-server")]
#[command(about = "Presence and message relay for project chat rooms", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, env = "HOST", default_value = config::DEFAULT_HOST)]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, env = "PORT", default_value_t = config::DEFAULT_PORT)]
    port: u16,

    /// Base URL of the message store service
    #[arg(long, env = "STORE_URL", default_value = config::DEFAULT_STORE_URL)]
    store_url: String,

    /// Timeout for every message store call, in seconds
    #[arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = 5)]
    store_timeout_secs: u64,

    /// Comma separated list of allowed browser origins ("*" allows any)
    #[arg(long, env = "CORS_ORIGINS")]
    cors_origins: Option<String>,

    /// Deployment name reported by /health
    #[arg(long, env = "ENVIRONMENT", default_value = config::DEFAULT_ENVIRONMENT)]
    environment: String,

    /// Default log level when RUST_LOG is not set
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        let defaults = ServerConfig::default();
        ServerConfig {
            host: self.host,
            port: self.port,
            store_url: self.store_url,
            store_timeout: Duration::from_secs(self.store_timeout_secs),
            cors_origins: self
                .cors_origins
                .as_deref()
                .map(config::parse_origins)
                .unwrap_or(defaults.cors_origins),
            environment: self.environment,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = args.into_config();

    // Initialize dependencies in order:
    // 1. Repository
    // 2. MessagePusher
    // 3. MessageStore
    // 4. AppState (use cases)
    // 5. Server

    // 1. Create Repository (in-memory room registry)
    let repository = Arc::new(InMemoryRoomRepository::new());

    // 2. Create MessagePusher (WebSocket implementation)
    let message_pusher = Arc::new(WebSocketMessagePusher::new());

    // 3. Create MessageStore (HTTP client)
    let store = match HttpMessageStore::new(config.store_url.clone(), config.store_timeout) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::error!("Failed to build message store client: {}", e);
            std::process::exit(1);
        }
    };

    // 4. Wire use cases
    let state = AppState::new(
        repository,
        message_pusher,
        store,
        Arc::new(SystemClock),
        config.store_timeout,
        config.environment.clone(),
    );

    // 5. Create and run the server
    let server = Server::new(state, config);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
