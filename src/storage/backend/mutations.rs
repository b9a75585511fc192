//! Mutation operations for SeaOrmStorage
//!
//! This module contains all write database operations on the macros table.

use sea_orm::{
    ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter, TransactionTrait,
    sea_query::OnConflict,
};
use tracing::info;

use super::converters::entry_to_active_model;
use super::{SeaOrmStorage, retry};
use crate::errors::{MacrodexError, Result};
use crate::storage::{EntryState, MacroEntry};

use migration::entities::{macro_entry, macro_report, macro_usage};

/// 冲突检测插入的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    NameTaken,
}

impl SeaOrmStorage {
    /// 插入新条目，名字已存在时不覆盖
    ///
    /// 唯一性由主键冲突决定：`ON CONFLICT (name) DO NOTHING` 后检查影响行数。
    pub async fn insert_new(&self, entry: &MacroEntry) -> Result<InsertOutcome> {
        let db = &self.db;

        let rows_affected = retry::with_retry(
            &format!("insert_new({})", entry.name),
            self.retry_config,
            || async {
                macro_entry::Entity::insert(entry_to_active_model(entry, true))
                    .on_conflict(
                        OnConflict::column(macro_entry::Column::Name)
                            .do_nothing()
                            .to_owned(),
                    )
                    .exec_without_returning(db)
                    .await
            },
        )
        .await
        .map_err(|e| MacrodexError::database(format!("插入宏失败: {}", e)))?;

        if rows_affected == 0 {
            return Ok(InsertOutcome::NameTaken);
        }

        info!(
            "Macro inserted: {} (state: {})",
            entry.name,
            entry.state.as_ref()
        );
        Ok(InsertOutcome::Inserted)
    }

    /// 用合成结果覆盖产物字段并标记为 ready
    ///
    /// 返回 false 表示行已不存在（例如被超时清理）。
    pub async fn finalize(&self, entry: &MacroEntry) -> Result<bool> {
        let db = &self.db;
        let mut am = entry_to_active_model(entry, false);
        am.state = Set(EntryState::Ready.as_ref().to_string());

        let result = retry::with_retry(
            &format!("finalize({})", entry.name),
            self.retry_config,
            || async {
                macro_entry::Entity::update_many()
                    .set(am.clone())
                    .filter(macro_entry::Column::Name.eq(entry.name.as_str()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| MacrodexError::database(format!("更新宏失败: {}", e)))?;

        Ok(result.rows_affected > 0)
    }

    /// 删除单个条目（不含计数器）
    pub async fn delete(&self, name: &str) -> Result<bool> {
        let db = &self.db;
        let name_owned = name.to_string();

        let result = retry::with_retry(&format!("delete({})", name), self.retry_config, || async {
            macro_entry::Entity::delete_by_id(name_owned.clone())
                .exec(db)
                .await
        })
        .await
        .map_err(|e| MacrodexError::database(format!("删除宏失败: {}", e)))?;

        if result.rows_affected > 0 {
            info!("Macro deleted: {}", name);
        }
        Ok(result.rows_affected > 0)
    }

    /// 删除条目及其使用、举报记录
    pub async fn purge(&self, name: &str) -> Result<()> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| MacrodexError::database(format!("开始事务失败: {}", e)))?;

        macro_usage::Entity::delete_by_id(name.to_string())
            .exec(&txn)
            .await
            .map_err(|e| MacrodexError::database(format!("删除使用记录失败: {}", e)))?;
        macro_report::Entity::delete_by_id(name.to_string())
            .exec(&txn)
            .await
            .map_err(|e| MacrodexError::database(format!("删除举报记录失败: {}", e)))?;
        macro_entry::Entity::delete_by_id(name.to_string())
            .exec(&txn)
            .await
            .map_err(|e| MacrodexError::database(format!("删除宏失败: {}", e)))?;

        txn.commit()
            .await
            .map_err(|e| MacrodexError::database(format!("提交事务失败: {}", e)))?;

        info!("Macro purged: {}", name);
        Ok(())
    }
}
