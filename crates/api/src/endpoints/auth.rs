//! Code resolution endpoint.

use axum::{Router, extract::State, routing::post};
use roompoll_common::AppResult;
use roompoll_core::Identity;
use serde::{Deserialize, Serialize};

use super::rooms::RoomResponse;
use crate::{extractors::AppJson, middleware::AppState, response::ApiResponse};

/// Resolve-code request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    pub code: String,
    /// Room an admin wants to work in.
    #[serde(default)]
    pub room_code: Option<String>,
}

/// Resolved identity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub is_admin: bool,
    /// Echoed back for admins only.
    pub admin_code: Option<String>,
    pub room: Option<RoomResponse>,
}

impl From<Identity> for AuthResponse {
    fn from(identity: Identity) -> Self {
        match identity {
            Identity::Admin { admin, room } => Self {
                is_admin: true,
                admin_code: Some(admin.admin_code),
                room: room.map(Into::into),
            },
            Identity::Room { room } => Self {
                is_admin: false,
                admin_code: None,
                room: Some(room.into()),
            },
        }
    }
}

/// Resolve an admin code or room code.
async fn authenticate(
    State(state): State<AppState>,
    AppJson(req): AppJson<AuthRequest>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let identity = state
        .auth_service
        .authenticate(&req.code, req.room_code.as_deref())
        .await?;

    Ok(ApiResponse::ok(identity.into()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/auth", post(authenticate))
}
