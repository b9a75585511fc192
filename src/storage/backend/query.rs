//! Query operations for SeaOrmStorage
//!
//! This module contains all read-only database operations.

use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};
use tracing::debug;

use super::converters::model_to_entry;
use super::{PAGE_SIZE, SeaOrmStorage, retry};
use crate::errors::{MacrodexError, Result};
use crate::storage::{EntryState, MacroEntry, MacroRecord, Page};

use migration::entities::{macro_entry, macro_usage};

/// 按使用次数倒序的排序表达式（无使用记录视为 0）
const USAGE_ORDER_EXPR: &str =
    "COALESCE(macro_usages.clicks, 0) + COALESCE(macro_usages.directs, 0)";

fn to_record(pair: (macro_entry::Model, Option<macro_usage::Model>)) -> MacroRecord {
    let (model, usage) = pair;
    let (clicks, directs) = usage.map(|u| (u.clicks, u.directs)).unwrap_or((0, 0));
    MacroRecord {
        entry: model_to_entry(model),
        clicks,
        directs,
    }
}

/// 多取一条用于判断 has_more
fn into_page(mut records: Vec<MacroRecord>, page_size: u64) -> Page<MacroRecord> {
    let has_more = records.len() as u64 > page_size;
    records.truncate(page_size as usize);
    Page {
        items: records,
        has_more,
    }
}

impl SeaOrmStorage {
    pub async fn get(&self, name: &str) -> Result<Option<MacroEntry>> {
        let db = &self.db;
        let name_owned = name.to_string();

        let model = retry::with_retry(&format!("get({})", name), self.retry_config, || async {
            macro_entry::Entity::find_by_id(name_owned.clone()).one(db).await
        })
        .await
        .map_err(|e| MacrodexError::database(format!("查询宏失败: {}", e)))?;

        Ok(model.map(model_to_entry))
    }

    /// 按原始 URL 查找已就绪的条目，用于去重
    pub async fn find_by_original_url(&self, original_url: &str) -> Result<Option<MacroEntry>> {
        let db = &self.db;
        let url_owned = original_url.to_string();

        let model = retry::with_retry("find_by_original_url", self.retry_config, || async {
            macro_entry::Entity::find()
                .filter(macro_entry::Column::OrigUrl.eq(url_owned.clone()))
                .filter(macro_entry::Column::State.eq(EntryState::Ready.as_ref()))
                .order_by_asc(macro_entry::Column::CreatedAt)
                .one(db)
                .await
        })
        .await
        .map_err(|e| MacrodexError::database(format!("按原始 URL 查询失败: {}", e)))?;

        Ok(model.map(model_to_entry))
    }

    /// 按名字批量获取（不分页）
    pub async fn get_many(&self, names: &[String]) -> Result<Vec<MacroRecord>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let rows = macro_entry::Entity::find()
            .filter(macro_entry::Column::Name.is_in(names.iter().cloned()))
            .find_also_related(macro_usage::Entity)
            .order_by_asc(macro_entry::Column::Name)
            .all(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("批量查询失败: {}", e)))?;

        debug!("get_many: {} requested, {} found", names.len(), rows.len());
        Ok(rows.into_iter().map(to_record).collect())
    }

    /// 名称模糊搜索，按使用次数倒序
    pub async fn search(&self, text: &str, page: u64) -> Result<Page<MacroRecord>> {
        let rows = macro_entry::Entity::find()
            .filter(macro_entry::Column::Name.contains(text))
            .filter(macro_entry::Column::State.eq(EntryState::Ready.as_ref()))
            .find_also_related(macro_usage::Entity)
            .order_by_desc(Expr::cust(USAGE_ORDER_EXPR))
            .order_by_asc(macro_entry::Column::Name)
            .limit(PAGE_SIZE + 1)
            .offset(page * PAGE_SIZE)
            .all(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("搜索失败: {}", e)))?;

        Ok(into_page(
            rows.into_iter().map(to_record).collect(),
            PAGE_SIZE,
        ))
    }

    /// 全量建议列表，按使用次数倒序
    pub async fn suggestions(&self, page: u64) -> Result<Page<MacroRecord>> {
        let rows = macro_entry::Entity::find()
            .filter(macro_entry::Column::State.eq(EntryState::Ready.as_ref()))
            .find_also_related(macro_usage::Entity)
            .order_by_desc(Expr::cust(USAGE_ORDER_EXPR))
            .order_by_asc(macro_entry::Column::Name)
            .limit(PAGE_SIZE + 1)
            .offset(page * PAGE_SIZE)
            .all(&self.db)
            .await
            .map_err(|e| MacrodexError::database(format!("查询建议列表失败: {}", e)))?;

        Ok(into_page(
            rows.into_iter().map(to_record).collect(),
            PAGE_SIZE,
        ))
    }
}
