//! 使用次数与举报计数

use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectionTrait, EntityTrait, ExprTrait, QueryFilter,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tracing::debug;

use super::{SeaOrmStorage, retry};
use crate::errors::{MacrodexError, Result};
use crate::storage::UsageTrigger;

use migration::entities::{macro_entry, macro_report, macro_usage};

async fn macro_exists<C: ConnectionTrait>(
    conn: &C,
    name: &str,
) -> std::result::Result<bool, sea_orm::DbErr> {
    Ok(macro_entry::Entity::find_by_id(name.to_string())
        .one(conn)
        .await?
        .is_some())
}

impl SeaOrmStorage {
    /// 累加使用次数；宏不存在时返回 false
    pub async fn record_usage(&self, name: &str, trigger: UsageTrigger) -> Result<bool> {
        let db = &self.db;

        retry::with_retry(&format!("record_usage({})", name), self.retry_config, || async {
            let txn = db.begin().await?;

            if !macro_exists(&txn, name).await? {
                txn.rollback().await?;
                return Ok(false);
            }

            macro_usage::Entity::insert(macro_usage::ActiveModel {
                macro_name: Set(name.to_string()),
                clicks: Set(0),
                directs: Set(0),
            })
            .on_conflict(
                OnConflict::column(macro_usage::Column::MacroName)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&txn)
            .await?;

            let column = match trigger {
                UsageTrigger::Click => macro_usage::Column::Clicks,
                UsageTrigger::Direct => macro_usage::Column::Directs,
            };
            macro_usage::Entity::update_many()
                .col_expr(column, Expr::col(column).add(1))
                .filter(macro_usage::Column::MacroName.eq(name))
                .exec(&txn)
                .await?;

            txn.commit().await?;
            Ok(true)
        })
        .await
        .map_err(|e| MacrodexError::database(format!("更新使用次数失败: {}", e)))
    }

    /// 举报计数 +1，返回新的计数；宏不存在时返回 None
    pub async fn increment_reports(&self, name: &str) -> Result<Option<i64>> {
        let db = &self.db;

        retry::with_retry(
            &format!("increment_reports({})", name),
            self.retry_config,
            || async {
                let txn = db.begin().await?;

                if !macro_exists(&txn, name).await? {
                    txn.rollback().await?;
                    return Ok(None);
                }

                macro_report::Entity::insert(macro_report::ActiveModel {
                    macro_name: Set(name.to_string()),
                    reports: Set(0),
                })
                .on_conflict(
                    OnConflict::column(macro_report::Column::MacroName)
                        .do_nothing()
                        .to_owned(),
                )
                .exec_without_returning(&txn)
                .await?;

                macro_report::Entity::update_many()
                    .col_expr(
                        macro_report::Column::Reports,
                        Expr::col(macro_report::Column::Reports).add(1),
                    )
                    .filter(macro_report::Column::MacroName.eq(name))
                    .exec(&txn)
                    .await?;

                let count = macro_report::Entity::find_by_id(name.to_string())
                    .one(&txn)
                    .await?
                    .map(|r| r.reports)
                    .unwrap_or(0);

                txn.commit().await?;
                Ok(Some(count))
            },
        )
        .await
        .map_err(|e| MacrodexError::database(format!("更新举报计数失败: {}", e)))
    }

    pub async fn reset_reports(&self, name: &str) -> Result<()> {
        macro_report::Entity::update_many()
            .col_expr(macro_report::Column::Reports, Expr::value(0i64))
            .filter(macro_report::Column::MacroName.eq(name))
            .exec(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("重置举报计数失败: {}", e)))?;

        debug!("Report counter reset: {}", name);
        Ok(())
    }

    pub async fn report_count(&self, name: &str) -> Result<i64> {
        let row = macro_report::Entity::find_by_id(name.to_string())
            .one(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("查询举报计数失败: {}", e)))?;

        Ok(row.map(|r| r.reports).unwrap_or(0))
    }

    /// 查询单个宏的 (clicks, directs)
    pub async fn usage(&self, name: &str) -> Result<(i64, i64)> {
        let row = macro_usage::Entity::find_by_id(name.to_string())
            .one(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("查询使用次数失败: {}", e)))?;

        Ok(row.map(|u| (u.clicks, u.directs)).unwrap_or((0, 0)))
    }
}
