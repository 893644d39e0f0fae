//! HTTP API response DTOs.

use std::collections::BTreeMap;

use serde::Serialize;

use super::websocket::MemberDto;

#[derive(Debug, Clone, Serialize)]
pub struct HealthDto {
    pub status: String,
    pub message: String,
    pub environment: String,
    /// RFC 3339
    pub timestamp: String,
    pub active_rooms: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatsDto {
    pub active_connections: usize,
    /// room name -> member count
    pub rooms: BTreeMap<String, usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomSummaryDto {
    pub id: String,
    pub room: String,
    pub count: usize,
    pub members: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoomDetailDto {
    pub id: String,
    pub room: String,
    pub count: usize,
    pub members: Vec<MemberDto>,
    pub created_at: String,
}

/// Result of probing the message store
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StoreCheckDto {
    Success {
        store_response: serde_json::Value,
    },
    Error {
        error: String,
        code: String,
        details: serde_json::Value,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct ClearedRoomsDto {
    pub cleared: Vec<String>,
    pub notified_connections: usize,
}
