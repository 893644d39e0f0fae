//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chatrelay_shared::time::{get_utc_timestamp, timestamp_to_rfc3339};

use crate::{
    domain::{ProjectId, Room},
    infrastructure::dto::http::{
        ClearedRoomsDto, HealthDto, RoomDetailDto, RoomSummaryDto, StatsDto, StoreCheckDto,
    },
    ui::state::AppState,
};

const ADMIN_RESET_REASON: &str = "Room cleared by administrator";

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let active_rooms = state
        .get_rooms_usecase
        .list()
        .await
        .iter()
        .map(Room::name)
        .collect();

    Json(HealthDto {
        status: "healthy".to_string(),
        message: "Chat relay is running".to_string(),
        environment: state.environment.clone(),
        timestamp: timestamp_to_rfc3339(get_utc_timestamp()),
        active_rooms,
    })
}

/// Connection and room counters
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsDto> {
    let stats = state.get_rooms_usecase.stats().await;
    Json(StatsDto {
        active_connections: stats.active_connections,
        rooms: stats.rooms,
    })
}

/// Probe the message store; failures are reported in the body, not the status
pub async fn test_store(State(state): State<Arc<AppState>>) -> Json<StoreCheckDto> {
    match state.check_store_usecase.execute().await {
        Ok(store_response) => Json(StoreCheckDto::Success { store_response }),
        Err(e) => Json(StoreCheckDto::Error {
            error: e.to_string(),
            code: e.code().to_string(),
            details: e.details(),
        }),
    }
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.list().await;
    Json(rooms.iter().map(Into::into).collect())
}

/// Get room detail by project id
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    let project_id = ProjectId::new(project_id).map_err(|_| StatusCode::NOT_FOUND)?;
    match state.get_rooms_usecase.detail(&project_id).await {
        Some(room) => Ok(Json((&room).into())),
        None => Err(StatusCode::NOT_FOUND),
    }
}

/// Force-clear every room
pub async fn clear_rooms(State(state): State<Arc<AppState>>) -> Json<ClearedRoomsDto> {
    let rooms = state.membership.clear_all(ADMIN_RESET_REASON).await;
    Json(cleared(&rooms))
}

/// Force-clear one room
pub async fn clear_room(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Result<Json<ClearedRoomsDto>, StatusCode> {
    let project_id = ProjectId::new(project_id).map_err(|_| StatusCode::NOT_FOUND)?;
    match state
        .membership
        .clear_room(&project_id, ADMIN_RESET_REASON)
        .await
    {
        Some(room) => Ok(Json(cleared(std::slice::from_ref(&room)))),
        None => Err(StatusCode::NOT_FOUND),
    }
}

fn cleared(rooms: &[Room]) -> ClearedRoomsDto {
    ClearedRoomsDto {
        cleared: rooms.iter().map(Room::name).collect(),
        notified_connections: rooms.iter().map(Room::member_count).sum(),
    }
}
