//! Authorization gate.
//!
//! Resolves admin codes and room codes to identities. There are no sessions:
//! every admin operation re-resolves the code it was given.
//!
//! Admin codes are compared by exact equality against the stored value and
//! are not hashed at rest.

use roompoll_common::{AppError, AppResult};
use roompoll_db::entities::{admin_user, room};
use roompoll_db::repositories::{AdminUserRepository, RoomRepository};
use tracing::debug;

/// Who a code belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    /// The code is an admin secret. `room` is the room the caller asked
    /// for, if it exists.
    Admin {
        admin: admin_user::Model,
        room: Option<room::Model>,
    },
    /// The code is a room join code.
    Room { room: room::Model },
}

impl Identity {
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin { .. })
    }

    #[must_use]
    pub const fn room(&self) -> Option<&room::Model> {
        match self {
            Self::Admin { room, .. } => room.as_ref(),
            Self::Room { room } => Some(room),
        }
    }
}

/// Service resolving codes to identities.
#[derive(Clone)]
pub struct AuthService {
    admin_repo: AdminUserRepository,
    room_repo: RoomRepository,
}

impl AuthService {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(admin_repo: AdminUserRepository, room_repo: RoomRepository) -> Self {
        Self {
            admin_repo,
            room_repo,
        }
    }

    /// Look up an admin principal by code.
    pub async fn resolve_admin(&self, admin_code: &str) -> AppResult<Option<admin_user::Model>> {
        self.admin_repo.find_by_admin_code(admin_code).await
    }

    /// Look up an admin principal, failing with `InvalidAdminCode`.
    pub async fn require_admin(&self, admin_code: &str) -> AppResult<admin_user::Model> {
        self.resolve_admin(admin_code)
            .await?
            .ok_or(AppError::InvalidAdminCode)
    }

    /// Look up a room by join code.
    pub async fn resolve_room(&self, code: &str) -> AppResult<Option<room::Model>> {
        self.room_repo.find_by_code(code).await
    }

    /// Resolve a code typed by a user.
    ///
    /// Admin codes win over room codes. For an admin, `room_code` selects the
    /// room to work in; without it the room the admin was provisioned with
    /// is used. Either may be missing, which leaves `room` empty.
    pub async fn authenticate(&self, code: &str, room_code: Option<&str>) -> AppResult<Identity> {
        if let Some(admin) = self.resolve_admin(code).await? {
            let wanted = room_code.or(admin.room_code.as_deref());
            let room = match wanted {
                Some(room_code) => self.resolve_room(room_code).await?,
                None => None,
            };

            debug!(admin_id = %admin.id, has_room = room.is_some(), "Authenticated admin");
            return Ok(Identity::Admin { admin, room });
        }

        match self.resolve_room(code).await? {
            Some(room) => Ok(Identity::Room { room }),
            None => Err(AppError::InvalidCode),
        }
    }
}
