//! Create misuse log table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MisuseLog::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MisuseLog::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MisuseLog::UserId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(MisuseLog::ActionType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(MisuseLog::Details).text().not_null())
                    .col(
                        ColumnDef::new(MisuseLog::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_misuse_log_user")
                            .from(MisuseLog::Table, MisuseLog::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: user_id (for per-user audit queries)
        manager
            .create_index(
                Index::create()
                    .name("idx_misuse_log_user_id")
                    .table(MisuseLog::Table)
                    .col(MisuseLog::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MisuseLog::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MisuseLog {
    Table,
    Id,
    UserId,
    ActionType,
    Details,
    CreatedAt,
}

#[derive(Iden)]
enum User {
    Table,
    Id,
}
