//! WebSocket connection handlers.
//!
//! Each connection owns its `ConnectionSession`. Inbound frames are handled
//! one at a time in the receive loop; only the calls that wait on the
//! message store (history, relay) are spawned so a slow store never blocks
//! the connection.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionSession, JoinRequest, LeaveRequest, OutgoingMessage, ProjectId,
        PushEvent,
    },
    infrastructure::dto::websocket::InboundEvent,
    ui::state::AppState,
};

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Spawns a task that forwards frames queued for this connection to its socket.
///
/// The task ends when the socket refuses a write or the queue is closed.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if sender.send(Message::Text(frame.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let mut session = state.connect_client_usecase.execute(tx).await;
    let connection_id = session.connection_id();

    let (sender, mut receiver) = socket.split();
    let mut send_task = pusher_loop(rx, sender);

    loop {
        tokio::select! {
            frame = receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        handle_text(&state, &mut session, text.as_str()).await;
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::debug!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    // ping/pong is answered by the protocol layer
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::warn!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                }
            }
            _ = &mut send_task => break,
        }
    }

    send_task.abort();
    state.disconnect_client_usecase.execute(session).await;
}

async fn handle_text(state: &Arc<AppState>, session: &mut ConnectionSession, text: &str) {
    let connection_id = session.connection_id();
    let event = match InboundEvent::parse(text) {
        Ok(event) => event,
        Err(e) => {
            reject(state, connection_id, e.event, e.message).await;
            return;
        }
    };
    let event_name = event.name();
    tracing::debug!("Connection '{}' sent '{}'", connection_id, event_name);

    match event {
        InboundEvent::JoinRoom(payload) | InboundEvent::RejoinRoom(payload) => {
            match JoinRequest::try_from(payload) {
                Ok(request) => {
                    let project_id = request.project_id.clone();
                    let joined = if event_name == "rejoin_room" {
                        state.membership.rejoin(session, request).await
                    } else {
                        state.membership.join(session, request).await
                    };
                    match joined {
                        // membership is visible before the store is asked for history
                        Ok(_) => spawn_history(state, connection_id, project_id),
                        Err(e) => {
                            tracing::error!("'{}' on '{}' failed: {}", event_name, connection_id, e)
                        }
                    }
                }
                Err(e) => {
                    reject(state, connection_id, event_name.to_string(), e.to_string()).await
                }
            }
        }
        InboundEvent::LeaveRoom(payload) => match LeaveRequest::try_from(payload) {
            Ok(request) => {
                state.membership.leave(session, request).await;
            }
            Err(e) => reject(state, connection_id, event_name.to_string(), e.to_string()).await,
        },
        InboundEvent::SendMessage(payload) => match OutgoingMessage::try_from(payload) {
            Ok(message) => {
                let send_message_usecase = state.send_message_usecase.clone();
                tokio::spawn(async move {
                    // failures are already reported to the sender
                    let _ = send_message_usecase.execute(connection_id, message).await;
                });
            }
            Err(e) => reject(state, connection_id, event_name.to_string(), e.to_string()).await,
        },
        InboundEvent::RequestRoomSnapshot(payload) => match ProjectId::try_from(payload.project_id)
        {
            Ok(project_id) => {
                state.membership.snapshot(connection_id, project_id).await;
            }
            Err(e) => reject(state, connection_id, event_name.to_string(), e.to_string()).await,
        },
        InboundEvent::RequestHistory(payload) => match ProjectId::try_from(payload.project_id) {
            Ok(project_id) => spawn_history(state, connection_id, project_id),
            Err(e) => reject(state, connection_id, event_name.to_string(), e.to_string()).await,
        },
        InboundEvent::Keepalive => {
            push(state, connection_id, &PushEvent::KeepaliveAck).await;
        }
    }
}

fn spawn_history(state: &Arc<AppState>, requester: ConnectionId, project_id: ProjectId) {
    let fetch_history_usecase = state.fetch_history_usecase.clone();
    tokio::spawn(async move {
        // failures are already reported to the requester
        let _ = fetch_history_usecase.execute(requester, project_id).await;
    });
}

async fn reject(state: &Arc<AppState>, connection_id: ConnectionId, event: String, message: String) {
    tracing::warn!(
        "Rejected '{}' from '{}': {}",
        event,
        connection_id,
        message
    );
    push(
        state,
        connection_id,
        &PushEvent::InvalidPayload { event, message },
    )
    .await;
}

async fn push(state: &Arc<AppState>, connection_id: ConnectionId, event: &PushEvent) {
    if let Err(e) = state.message_pusher.push_to(&connection_id, event).await {
        tracing::warn!("Failed to send to '{}': {}", connection_id, e);
    }
}
