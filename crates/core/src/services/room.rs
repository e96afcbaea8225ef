//! Room provisioning service.

use chrono::Utc;
use roompoll_common::{
    ADMIN_CODE_LENGTH, AppError, AppResult, IdGenerator, ROOM_CODE_LENGTH, generate_code,
};
use roompoll_db::entities::{admin_user, room};
use roompoll_db::repositories::{AdminUserRepository, RoomRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::auth::AuthService;

/// Attempts at drawing an unused code before giving up.
const MAX_CODE_ATTEMPTS: usize = 8;

/// Input for creating a room.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomInput {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
}

/// Service for provisioning admins and rooms.
#[derive(Clone)]
pub struct RoomService {
    room_repo: RoomRepository,
    admin_repo: AdminUserRepository,
    auth: AuthService,
    id_gen: IdGenerator,
}

impl RoomService {
    /// Create a new room service.
    #[must_use]
    pub const fn new(
        room_repo: RoomRepository,
        admin_repo: AdminUserRepository,
        auth: AuthService,
    ) -> Self {
        Self {
            room_repo,
            admin_repo,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Provision a new admin principal and return its secret code.
    pub async fn create_admin(&self) -> AppResult<String> {
        let mut admin_code = None;
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = generate_code(ADMIN_CODE_LENGTH);
            if !self.admin_repo.code_exists(&candidate).await? {
                admin_code = Some(candidate);
                break;
            }
        }
        let admin_code = admin_code
            .ok_or_else(|| AppError::Internal("Could not allocate an admin code".to_string()))?;

        let model = admin_user::ActiveModel {
            id: Set(self.id_gen.generate()),
            admin_code: Set(admin_code.clone()),
            room_code: Set(None),
            created_at: Set(Utc::now().into()),
        };
        let admin = self.admin_repo.create(model).await?;

        info!(admin_id = %admin.id, "Provisioned admin");
        Ok(admin_code)
    }

    /// Create a room with a fresh join code.
    pub async fn create_room(
        &self,
        admin_code: &str,
        input: CreateRoomInput,
    ) -> AppResult<room::Model> {
        let admin = self.auth.require_admin(admin_code).await?;

        input.validate()?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Room name must not be blank".to_string()));
        }

        let code = self.allocate_room_code().await?;
        let model = room::Model {
            id: self.id_gen.generate(),
            code,
            name: name.to_string(),
            created_at: Utc::now().into(),
        };

        let room = self.room_repo.create_with_admin(model, &admin.id).await?;

        info!(room_id = %room.id, admin_id = %admin.id, "Created room");
        Ok(room)
    }

    /// Rooms created by the admin, newest first.
    pub async fn list_rooms(&self, admin_code: &str) -> AppResult<Vec<room::Model>> {
        let admin = self.auth.require_admin(admin_code).await?;
        self.room_repo.find_by_admin(&admin.id).await
    }

    async fn allocate_room_code(&self) -> AppResult<String> {
        for _ in 0..MAX_CODE_ATTEMPTS {
            let candidate = generate_code(ROOM_CODE_LENGTH);
            if self.room_repo.find_by_code(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }

        Err(AppError::Internal(
            "Could not allocate a unique room code".to_string(),
        ))
    }
}
