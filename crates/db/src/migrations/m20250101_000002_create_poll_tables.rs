//! Create poll, question and choice tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Poll::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Poll::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Poll::RoomId).string_len(32).not_null())
                    .col(ColumnDef::new(Poll::Title).string_len(256).not_null())
                    .col(ColumnDef::new(Poll::Description).text())
                    .col(
                        ColumnDef::new(Poll::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Poll::ResultsVisible)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Poll::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_room")
                            .from(Poll::Table, Poll::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_poll_room_id")
                    .table(Poll::Table)
                    .col(Poll::RoomId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Question::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Question::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Question::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Question::Text).text().not_null())
                    .col(ColumnDef::new(Question::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_question_poll")
                            .from(Question::Table, Question::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_question_poll_id")
                    .table(Question::Table)
                    .col(Question::PollId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Choice::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Choice::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Choice::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Choice::Text).string_len(256).not_null())
                    .col(ColumnDef::new(Choice::Order).integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_choice_question")
                            .from(Choice::Table, Choice::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_choice_question_id")
                    .table(Choice::Table)
                    .col(Choice::QuestionId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Choice::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Question::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Poll::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
    RoomId,
    Title,
    Description,
    IsActive,
    ResultsVisible,
    CreatedAt,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
    PollId,
    Text,
    Order,
}

#[derive(Iden)]
enum Choice {
    Table,
    Id,
    QuestionId,
    Text,
    Order,
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
}
