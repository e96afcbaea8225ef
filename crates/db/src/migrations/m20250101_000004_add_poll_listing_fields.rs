//! Add listing fields to poll:
//! - `is_visible` to hide a poll from the participant listing (existing polls stay visible)
//! - `sort_date` for "move to top" ordering

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Poll::Table)
                    .add_column(
                        ColumnDef::new(Poll::IsVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(Poll::Table)
                    .add_column(ColumnDef::new(Poll::SortDate).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(Poll::Table)
                    .drop_column(Poll::SortDate)
                    .drop_column(Poll::IsVisible)
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum Poll {
    Table,
    IsVisible,
    SortDate,
}
