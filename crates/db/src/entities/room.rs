//! Room entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Room - a voting namespace joined by a short code.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "room")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Short join code (unique).
    #[sea_orm(unique, indexed)]
    pub code: String,

    /// Display name.
    pub name: String,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::poll::Entity")]
    Poll,
    #[sea_orm(has_many = "super::room_admin::Entity")]
    RoomAdmin,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl Related<super::room_admin::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RoomAdmin.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
