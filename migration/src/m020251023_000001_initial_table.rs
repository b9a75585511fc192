use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::DatabaseBackend;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 macros 表，name 为主键，唯一性由存储层保证
        manager
            .create_table(
                Table::create()
                    .table(Macros::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Macros::Name)
                            .string_len(255)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Macros::Url).text().not_null())
                    .col(ColumnDef::new(Macros::OrigUrl).text().not_null())
                    .col(
                        ColumnDef::new(Macros::UrlSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Macros::Thumbnail)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Macros::ThumbnailSize)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Macros::IsGif)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Macros::GifThumbnail).text().null())
                    .col(ColumnDef::new(Macros::GifThumbnailSize).big_integer().null())
                    .col(ColumnDef::new(Macros::Width).big_integer().null())
                    .col(ColumnDef::new(Macros::Height).big_integer().null())
                    .col(
                        ColumnDef::new(Macros::State)
                            .string_len(16)
                            .not_null()
                            .default("ready"),
                    )
                    .col(
                        ColumnDef::new(Macros::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 按原始 URL 去重查询；MySQL 的 TEXT 列索引需要前缀长度
        let conn = manager.get_connection();
        match manager.get_database_backend() {
            DatabaseBackend::MySql => {
                conn.execute_unprepared(
                    "CREATE INDEX idx_macros_orig_url ON macros (orig_url(255))",
                )
                .await
                .ok(); // 忽略错误（索引可能已存在）
            }
            _ => {
                conn.execute_unprepared(
                    "CREATE INDEX IF NOT EXISTS idx_macros_orig_url ON macros (orig_url)",
                )
                .await?;
            }
        }

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_macros_created_at")
                    .table(Macros::Table)
                    .col(Macros::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_macros_created_at").to_owned())
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP INDEX IF EXISTS idx_macros_orig_url")
            .await
            .ok();

        manager
            .drop_table(Table::drop().table(Macros::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Macros {
    Table,
    Name,
    Url,
    OrigUrl,
    UrlSize,
    Thumbnail,
    ThumbnailSize,
    IsGif,
    GifThumbnail,
    GifThumbnailSize,
    Width,
    Height,
    State,
    CreatedAt,
}
