//! Shared helpers for the integration tests: an in-process message store
//! stub, the relay itself on an ephemeral port, and a WebSocket test client.

#![allow(dead_code)]

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use chatrelay_server::{
    config::ServerConfig,
    infrastructure::{HttpMessageStore, InMemoryRoomRepository, WebSocketMessagePusher},
    ui::{AppState, Server},
};
use chatrelay_shared::time::SystemClock;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

pub const CREATED_AT: &str = "2023-01-01T00:00:00Z";
pub const FIRST_MESSAGE_ID: i64 = 42;

/// How the stub store answers `save-message`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Accept,
    Reject,
    Slow(Duration),
}

#[derive(Clone)]
pub struct StubStore {
    saved: Arc<Mutex<Vec<Value>>>,
    mode: Arc<Mutex<StoreMode>>,
}

impl StubStore {
    pub fn new() -> Self {
        Self {
            saved: Arc::new(Mutex::new(Vec::new())),
            mode: Arc::new(Mutex::new(StoreMode::Accept)),
        }
    }

    pub fn set_mode(&self, mode: StoreMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn saved(&self) -> Vec<Value> {
        self.saved.lock().unwrap().clone()
    }

    /// Serve the stub on an ephemeral port and return its base URL
    pub async fn spawn(&self) -> String {
        let app = Router::new()
            .route("/api/get-messages/{project_id}/", get(stub_history))
            .route("/api/save-message/", post(stub_save))
            .route("/api/test/", get(stub_test))
            .with_state(self.clone());
        let addr = serve(app).await;
        format!("http://{}", addr)
    }
}

async fn stub_history(
    State(store): State<StubStore>,
    Path(project_id): Path<String>,
) -> Json<Value> {
    let messages: Vec<Value> = store
        .saved()
        .into_iter()
        .filter(|m| m["project_id"] == project_id.as_str())
        .collect();
    Json(json!({ "messages": messages }))
}

async fn stub_save(
    State(store): State<StubStore>,
    Json(request): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mode = *store.mode.lock().unwrap();
    match mode {
        StoreMode::Reject => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"status": "error", "message": "project not found"})),
            );
        }
        StoreMode::Slow(delay) => tokio::time::sleep(delay).await,
        StoreMode::Accept => {}
    }

    let mut saved = store.saved.lock().unwrap();
    let id = FIRST_MESSAGE_ID + saved.len() as i64;
    saved.push(json!({
        "id": id,
        "project_id": request["project_id"],
        "body": request["body"],
        "author_id": request["author_id"],
        "created_at": CREATED_AT,
    }));
    (
        StatusCode::OK,
        Json(json!({"status": "success", "message_id": id, "created_at": CREATED_AT})),
    )
}

async fn stub_test() -> Json<Value> {
    Json(json!({"status": "ok", "service": "stub"}))
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// Address nothing listens on
pub async fn unused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

pub struct TestRelay {
    pub addr: SocketAddr,
}

impl TestRelay {
    pub async fn start(store_url: &str, store_timeout: Duration) -> Self {
        let config = ServerConfig {
            store_url: store_url.to_string(),
            store_timeout,
            environment: "test".to_string(),
            ..ServerConfig::default()
        };
        let store = Arc::new(HttpMessageStore::new(store_url, store_timeout).unwrap());
        let state = AppState::new(
            Arc::new(InMemoryRoomRepository::new()),
            Arc::new(WebSocketMessagePusher::new()),
            store,
            Arc::new(SystemClock),
            store_timeout,
            "test",
        );
        let router = Server::new(state, config).router();
        let addr = serve(router).await;
        Self { addr }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn connect(&self) -> TestClient {
        let (stream, _) = connect_async(self.ws_url()).await.unwrap();
        TestClient { stream }
    }
}

pub struct TestClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl TestClient {
    pub async fn send(&mut self, event: &str, data: Value) {
        let frame = json!({"event": event, "data": data}).to_string();
        self.stream.send(Message::text(frame)).await.unwrap();
    }

    pub async fn send_raw(&mut self, text: &str) {
        self.stream.send(Message::text(text)).await.unwrap();
    }

    pub async fn join(&mut self, project_id: &str, user_id: &str, username: &str) {
        self.send(
            "join_room",
            json!({"project_id": project_id, "user_id": user_id, "username": username}),
        )
        .await;
    }

    /// Next JSON frame, or `None` if nothing arrives within `wait`
    pub async fn next_within(&mut self, wait: Duration) -> Option<Value> {
        loop {
            let frame = tokio::time::timeout(wait, self.stream.next()).await.ok()??;
            match frame.unwrap() {
                Message::Text(text) => return Some(serde_json::from_str(text.as_str()).unwrap()),
                Message::Close(_) => return None,
                _ => continue,
            }
        }
    }

    /// Skip frames until one with the given event name arrives
    pub async fn expect(&mut self, event: &str) -> Value {
        loop {
            let frame = self
                .next_within(Duration::from_secs(3))
                .await
                .unwrap_or_else(|| panic!("no '{}' event received", event));
            if frame["event"] == event {
                return frame["data"].clone();
            }
        }
    }

    /// Assert that no frame with this event name arrives within `wait`
    pub async fn expect_none(&mut self, event: &str, wait: Duration) {
        while let Some(frame) = self.next_within(wait).await {
            assert_ne!(frame["event"], event, "unexpected frame: {}", frame);
        }
    }

    pub async fn close(mut self) {
        let _ = self.stream.close(None).await;
    }
}
