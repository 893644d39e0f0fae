//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method},
    routing::{delete, get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;

use super::{
    handler::{
        clear_room, clear_rooms, get_room_detail, get_rooms, get_stats, health_check, test_store,
        websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Presence and message relay server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(repository, message_pusher, store, clock, timeout, "production");
/// Server::new(state, ServerConfig::default()).run().await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
    config: ServerConfig,
}

impl Server {
    pub fn new(state: AppState, config: ServerConfig) -> Self {
        Self {
            state: Arc::new(state),
            config,
        }
    }

    /// Every route of the relay, with CORS and request tracing applied
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/health", get(health_check))
            .route("/stats", get(get_stats))
            .route("/test-store", get(test_store))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{project_id}", get(get_room_detail))
            // 管理用エンドポイント
            .route("/admin/rooms/clear", post(clear_rooms))
            .route("/admin/rooms/{project_id}", delete(clear_room))
            .layer(cors_layer(&self.config.cors_origins))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Serve on an already bound listener until a shutdown signal arrives
    pub async fn serve(self, listener: TcpListener) -> std::io::Result<()> {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Bind to the configured address and run the relay
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind or if serving fails.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Relay server listening on {} ({})",
            listener.local_addr()?,
            self.config.environment
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Message store: {}", self.config.store_url);

        // the store check is informational only
        let check_store = self.state.check_store_usecase.clone();
        tokio::spawn(async move {
            let _ = check_store.execute().await;
        });

        self.serve(listener).await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!("Ignoring invalid CORS origin '{}': {}", origin, e);
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}
