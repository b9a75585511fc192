//! 使用次数与举报计数表
//!
//! 计数器与 macros 表分离，避免热点行上的写竞争。

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MacroUsages::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacroUsages::MacroName)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MacroUsages::Clicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MacroUsages::Directs)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MacroReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MacroReports::MacroName)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(MacroReports::Reports)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MacroReports::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(MacroUsages::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MacroUsages {
    Table,
    MacroName,
    Clicks,
    Directs,
}

#[derive(DeriveIden)]
enum MacroReports {
    Table,
    MacroName,
    Reports,
}
