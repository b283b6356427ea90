//! HTTP API endpoint handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    domain::{RoomId, UserId},
    infrastructure::dto::http::{
        DisconnectRequestDto, DisconnectResponseDto, RoomDetailDto, RoomSummaryDto,
    },
    ui::state::AppState,
    usecase::{GetRoomDetailError, KickError},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by ID
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(room_id).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(&room))),
        Err(GetRoomDetailError::InvalidRoomId) => Err(StatusCode::BAD_REQUEST),
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}

/// Force every connection of a user to disconnect
pub async fn disconnect_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Json(body): Json<DisconnectRequestDto>,
) -> Result<Json<DisconnectResponseDto>, StatusCode> {
    let user_id = UserId::new(user_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let reason = body
        .reason
        .unwrap_or_else(|| "disconnected by administrator".to_string());

    let disconnected = state
        .kick_user_usecase
        .disconnect_by_user_id(&user_id, &reason)
        .await;
    tracing::info!(
        "Administrative disconnect of user '{}' closed {} connection(s)",
        user_id,
        disconnected
    );
    Ok(Json(DisconnectResponseDto { disconnected }))
}

/// Ban a user from a room and kick their connections in it
pub async fn ban_user(
    State(state): State<Arc<AppState>>,
    Path((room_id, user_id)): Path<(String, String)>,
    Json(body): Json<DisconnectRequestDto>,
) -> Result<Json<DisconnectResponseDto>, StatusCode> {
    let room_id = RoomId::new(room_id).map_err(|_| StatusCode::BAD_REQUEST)?;
    let user_id = UserId::new(user_id).map_err(|_| StatusCode::BAD_REQUEST)?;

    match state
        .kick_user_usecase
        .ban_from_room(&room_id, &user_id, body.reason)
        .await
    {
        Ok(disconnected) => Ok(Json(DisconnectResponseDto { disconnected })),
        Err(KickError::Archive(e)) => {
            tracing::error!("Failed to record ban of '{}' in '{}': {}", user_id, room_id, e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}
