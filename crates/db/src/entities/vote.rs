//! Vote entity: one answer to one question by one voter.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "vote")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub poll_id: String,

    #[sea_orm(indexed)]
    pub question_id: String,

    #[sea_orm(indexed)]
    pub choice_id: String,

    /// Ballot grouping key. `None` for ballots that cannot be grouped.
    #[sea_orm(nullable)]
    pub voter_code: Option<String>,

    pub created_at: DateTimeWithTimeZone,
}

// Question and choice ids are plain columns; their removal is guarded by
// the poll repository.
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::poll::Entity",
        from = "Column::PollId",
        to = "super::poll::Column::Id",
        on_delete = "Cascade"
    )]
    Poll,
}

impl Related<super::poll::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Poll.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
