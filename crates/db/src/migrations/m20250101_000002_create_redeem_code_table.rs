//! Create redeem code table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(RedeemCode::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RedeemCode::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(RedeemCode::UserId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(RedeemCode::Title).string_len(256).not_null())
                    .col(ColumnDef::new(RedeemCode::Code).string_len(256).not_null())
                    .col(
                        ColumnDef::new(RedeemCode::CopyCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(RedeemCode::IsArchived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(RedeemCode::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(RedeemCode::UpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_redeem_code_user")
                            .from(RedeemCode::Table, RedeemCode::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for listing a user's codes)
        manager
            .create_index(
                Index::create()
                    .name("idx_redeem_code_user_id")
                    .table(RedeemCode::Table)
                    .col(RedeemCode::UserId)
                    .to_owned(),
            )
            .await?;

        // Index: (is_archived, copy_count) for the general listing filter
        manager
            .create_index(
                Index::create()
                    .name("idx_redeem_code_archived_copy_count")
                    .table(RedeemCode::Table)
                    .col(RedeemCode::IsArchived)
                    .col(RedeemCode::CopyCount)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(RedeemCode::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum RedeemCode {
    Table,
    Id,
    UserId,
    Title,
    Code,
    CopyCount,
    IsArchived,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
