//! Create room, `admin_user` and `room_admin` tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Room::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Room::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Room::Code).string_len(32).not_null())
                    .col(ColumnDef::new(Room::Name).string_len(128).not_null())
                    .col(
                        ColumnDef::new(Room::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_room_code")
                    .table(Room::Table)
                    .col(Room::Code)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AdminUser::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AdminUser::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AdminUser::AdminCode).string_len(64).not_null())
                    .col(ColumnDef::new(AdminUser::RoomCode).string_len(32))
                    .col(
                        ColumnDef::new(AdminUser::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_admin_user_admin_code")
                    .table(AdminUser::Table)
                    .col(AdminUser::AdminCode)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RoomAdmin::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(RoomAdmin::AdminId).string_len(32).not_null())
                    .col(ColumnDef::new(RoomAdmin::RoomId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(RoomAdmin::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(RoomAdmin::AdminId)
                            .col(RoomAdmin::RoomId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_admin_admin")
                            .from(RoomAdmin::Table, RoomAdmin::AdminId)
                            .to(AdminUser::Table, AdminUser::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_room_admin_room")
                            .from(RoomAdmin::Table, RoomAdmin::RoomId)
                            .to(Room::Table, Room::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RoomAdmin::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdminUser::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Room::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Room {
    Table,
    Id,
    Code,
    Name,
    CreatedAt,
}

#[derive(Iden)]
enum AdminUser {
    Table,
    Id,
    AdminCode,
    RoomCode,
    CreatedAt,
}

#[derive(Iden)]
enum RoomAdmin {
    Table,
    AdminId,
    RoomId,
    CreatedAt,
}
