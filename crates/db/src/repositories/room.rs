//! Room repository.

use std::sync::Arc;

use roompoll_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, Order, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::entities::{Room, RoomAdmin, room, room_admin};

/// Repository for rooms and the admins that created them.
#[derive(Clone)]
pub struct RoomRepository {
    db: Arc<DatabaseConnection>,
}

impl RoomRepository {
    /// Create a new room repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find room by its join code (exact match).
    pub async fn find_by_code(&self, code: &str) -> AppResult<Option<room::Model>> {
        Room::find()
            .filter(room::Column::Code.eq(code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get room by join code, returning `RoomNotFound` if absent.
    pub async fn get_by_code(&self, code: &str) -> AppResult<room::Model> {
        self.find_by_code(code).await?.ok_or(AppError::RoomNotFound)
    }

    /// Find rooms created by an admin, newest first.
    pub async fn find_by_admin(&self, admin_id: &str) -> AppResult<Vec<room::Model>> {
        let grants = RoomAdmin::find()
            .filter(room_admin::Column::AdminId.eq(admin_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let room_ids: Vec<String> = grants.into_iter().map(|g| g.room_id).collect();

        if room_ids.is_empty() {
            return Ok(vec![]);
        }

        Room::find()
            .filter(room::Column::Id.is_in(room_ids))
            .order_by(room::Column::CreatedAt, Order::Desc)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a room together with the admin grant, atomically.
    pub async fn create_with_admin(
        &self,
        room: room::Model,
        admin_id: &str,
    ) -> AppResult<room::Model> {
        let txn = self.db.begin().await?;

        Room::insert(room::ActiveModel::from(room.clone()))
            .exec_without_returning(&txn)
            .await?;

        let grant = room_admin::Model {
            admin_id: admin_id.to_string(),
            room_id: room.id.clone(),
            created_at: room.created_at,
        };
        RoomAdmin::insert(room_admin::ActiveModel::from(grant))
            .exec_without_returning(&txn)
            .await?;

        txn.commit().await?;

        Ok(room)
    }
}
