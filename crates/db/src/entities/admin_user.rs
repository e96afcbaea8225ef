//! Admin principal entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Holder of an admin secret.
///
/// The admin code is a bearer secret stored and compared in the clear.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "admin_user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Secret admin code (unique).
    #[sea_orm(unique, indexed)]
    #[serde(skip_serializing)]
    pub admin_code: String,

    /// Code of the room this admin was provisioned with, if any.
    #[sea_orm(nullable)]
    pub room_code: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::room_admin::Entity")]
    RoomAdmin,
}

impl Related<super::room_admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomAdmin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
