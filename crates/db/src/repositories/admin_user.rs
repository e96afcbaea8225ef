//! Admin principal repository.

use std::sync::Arc;

use roompoll_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

use crate::entities::{AdminUser, admin_user};

/// Repository for admin principals.
#[derive(Clone)]
pub struct AdminUserRepository {
    db: Arc<DatabaseConnection>,
}

impl AdminUserRepository {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an admin by exact admin code.
    pub async fn find_by_admin_code(&self, admin_code: &str) -> AppResult<Option<admin_user::Model>> {
        AdminUser::find()
            .filter(admin_user::Column::AdminCode.eq(admin_code))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether an admin code is already taken.
    pub async fn code_exists(&self, admin_code: &str) -> AppResult<bool> {
        Ok(self.find_by_admin_code(admin_code).await?.is_some())
    }

    /// Create a new admin principal.
    pub async fn create(&self, model: admin_user::ActiveModel) -> AppResult<admin_user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
