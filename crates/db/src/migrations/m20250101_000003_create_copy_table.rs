//! Create copy table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Copy::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Copy::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Copy::UserId).string_len(32).not_null())
                    .col(ColumnDef::new(Copy::CodeId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Copy::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_copy_user")
                            .from(Copy::Table, Copy::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_copy_redeem_code")
                            .from(Copy::Table, Copy::CodeId)
                            .to(RedeemCode::Table, RedeemCode::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: (user_id, code_id) - a user can copy a code at most
        // once. This constraint, not the application pre-check, is the
        // double-copy race guard.
        manager
            .create_index(
                Index::create()
                    .name("idx_copy_user_code")
                    .table(Copy::Table)
                    .col(Copy::UserId)
                    .col(Copy::CodeId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: (user_id, created_at) for the detector's recency window
        manager
            .create_index(
                Index::create()
                    .name("idx_copy_user_created_at")
                    .table(Copy::Table)
                    .col(Copy::UserId)
                    .col(Copy::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Copy::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Copy {
    Table,
    Id,
    UserId,
    CodeId,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}

#[derive(Iden)]
enum RedeemCode {
    Table,
    Id,
}
