//! Room endpoints.

use axum::{Router, extract::State, routing::post};
use roompoll_common::AppResult;
use roompoll_core::CreateRoomInput;
use roompoll_db::entities::room;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AdminInput, AppJson},
    middleware::AppState,
    response::ApiResponse,
};

// ==================== Request/Response Types ====================

/// Room response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub created_at: String,
}

impl From<room::Model> for RoomResponse {
    fn from(r: room::Model) -> Self {
        Self {
            id: r.id,
            code: r.code,
            name: r.name,
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// Created room response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomResponse {
    pub room_id: String,
    pub room_code: String,
}

/// Request carrying only an admin code.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRoomsRequest {
    pub admin_code: String,
}

// ==================== Handlers ====================

/// Create a room.
async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<CreateRoomInput>>,
) -> AppResult<ApiResponse<CreateRoomResponse>> {
    let room = state
        .room_service
        .create_room(&req.admin_code, req.input)
        .await?;

    Ok(ApiResponse::ok(CreateRoomResponse {
        room_id: room.id,
        room_code: room.code,
    }))
}

/// List rooms created by the admin.
async fn list(
    State(state): State<AppState>,
    AppJson(req): AppJson<ListRoomsRequest>,
) -> AppResult<ApiResponse<Vec<RoomResponse>>> {
    let rooms = state.room_service.list_rooms(&req.admin_code).await?;

    Ok(ApiResponse::ok(rooms.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/list", post(list))
}
