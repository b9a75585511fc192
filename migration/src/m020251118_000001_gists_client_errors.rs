//! gist 账本与客户端错误日志表

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Gists::Id)
                            .string_len(64)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Gists::Comments)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Gists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 取最新 gist 时按创建时间倒序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gists_created_at")
                    .table(Gists::Table)
                    .col(Gists::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientErrors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientErrors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClientErrors::ClientVersion)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClientErrors::ErrorType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClientErrors::Stacktrace).text().not_null())
                    .col(
                        ColumnDef::new(ClientErrors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientErrors::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_gists_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Gists::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Gists {
    Table,
    Id,
    Comments,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClientErrors {
    Table,
    Id,
    ClientVersion,
    ErrorType,
    Stacktrace,
    CreatedAt,
}
