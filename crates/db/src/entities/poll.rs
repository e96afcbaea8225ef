//! Poll entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A titled, ordered set of questions inside a room.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "poll")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning room. Never changes after creation.
    #[sea_orm(indexed)]
    pub room_id: String,

    pub title: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    /// Whether votes are accepted.
    pub is_active: bool,

    /// Whether the poll is listed for participants.
    pub is_visible: bool,

    /// Whether non-admins may read aggregated results.
    pub results_visible: bool,

    /// Display ordering key, bumped by "move to top".
    #[sea_orm(nullable)]
    pub sort_date: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,
}

impl Model {
    /// Key used to order polls for display (newest first).
    #[must_use]
    pub fn display_date(&self) -> DateTimeWithTimeZone {
        self.sort_date.unwrap_or(self.created_at)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::room::Entity",
        from = "Column::RoomId",
        to = "super::room::Column::Id",
        on_delete = "Cascade"
    )]
    Room,
    #[sea_orm(has_many = "super::question::Entity")]
    Question,
    #[sea_orm(has_many = "super::vote::Entity")]
    Vote,
}

impl Related<super::room::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Room.def()
    }
}

impl Related<super::question::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Question.def()
    }
}

impl Related<super::vote::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vote.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
