//! Create vote table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Vote::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Vote::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Vote::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::QuestionId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::ChoiceId).string_len(32).not_null())
                    .col(ColumnDef::new(Vote::VoterCode).string_len(64))
                    .col(
                        ColumnDef::new(Vote::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_poll")
                            .from(Vote::Table, Vote::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    // Checked at statement end, so poll deletes still cascade.
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_question")
                            .from(Vote::Table, Vote::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_vote_choice")
                            .from(Vote::Table, Vote::ChoiceId)
                            .to(Choice::Table, Choice::Id)
                            .on_delete(ForeignKeyAction::NoAction),
                    )
                    .to_owned(),
            )
            .await?;

        // Ballot lookups (has voted, voter counts, votes table)
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_poll_voter")
                    .table(Vote::Table)
                    .col(Vote::PollId)
                    .col(Vote::VoterCode)
                    .to_owned(),
            )
            .await?;

        // Guards for structural poll edits
        manager
            .create_index(
                Index::create()
                    .name("idx_vote_question_id")
                    .table(Vote::Table)
                    .col(Vote::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_vote_choice_id")
                    .table(Vote::Table)
                    .col(Vote::ChoiceId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Vote::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Vote {
    Table,
    Id,
    PollId,
    QuestionId,
    ChoiceId,
    VoterCode,
    CreatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}

#[derive(Iden)]
enum Choice {
    Table,
    Id,
}
