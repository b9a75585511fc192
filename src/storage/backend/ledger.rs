//! gist 账本与客户端错误日志

use chrono::Utc;
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, EntityTrait, ExprTrait, QueryFilter, QueryOrder,
    sea_query::Expr,
};

use super::SeaOrmStorage;
use crate::errors::{MacrodexError, Result};
use crate::storage::{ClientErrorReport, GistRecord};

use migration::entities::{client_error, gist};

impl SeaOrmStorage {
    /// 最新创建的 gist
    pub async fn latest_gist(&self) -> Result<Option<GistRecord>> {
        let row = gist::Entity::find()
            .order_by_desc(gist::Column::CreatedAt)
            .one(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("查询 gist 失败: {}", e)))?;

        Ok(row.map(|g| GistRecord {
            id: g.id,
            comments: g.comments,
            created_at: g.created_at,
        }))
    }

    pub async fn insert_gist(&self, id: &str) -> Result<GistRecord> {
        let record = GistRecord {
            id: id.to_string(),
            comments: 0,
            created_at: Utc::now(),
        };

        gist::Entity::insert(gist::ActiveModel {
            id: Set(record.id.clone()),
            comments: Set(record.comments),
            created_at: Set(record.created_at),
        })
        .exec_without_returning(&self.db)
        .await
        .map_err(|e| MacrodexError::database(format!("记录 gist 失败: {}", e)))?;

        Ok(record)
    }

    pub async fn increment_gist_comments(&self, id: &str) -> Result<()> {
        gist::Entity::update_many()
            .col_expr(gist::Column::Comments, Expr::col(gist::Column::Comments).add(1))
            .filter(gist::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("更新 gist 评论数失败: {}", e)))?;
        Ok(())
    }

    pub async fn insert_client_error(&self, report: &ClientErrorReport) -> Result<()> {
        client_error::Entity::insert(client_error::ActiveModel {
            id: NotSet,
            client_version: Set(report.client_version.clone()),
            error_type: Set(report.error_type.as_ref().to_string()),
            stacktrace: Set(report.stacktrace.clone()),
            created_at: Set(Utc::now()),
        })
        .exec_without_returning(&self.db)
        .await
        .map_err(|e| MacrodexError::database(format!("记录客户端错误失败: {}", e)))?;
        Ok(())
    }

    pub async fn client_error_count(&self) -> Result<u64> {
        use sea_orm::PaginatorTrait;

        client_error::Entity::find()
            .count(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("统计客户端错误失败: {}", e)))
    }
}
