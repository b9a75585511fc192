//! 重复检测：名字冲突与原始 URL 复用

use tracing::info;

use crate::errors::{MacrodexError, Result};
use crate::storage::{MacroEntry, SeaOrmStorage};

/// 去重判定结果
#[derive(Debug, Clone)]
pub enum DedupDecision {
    /// 没有可复用的条目，需要完整入库
    Fresh,
    /// 已有相同原始 URL 的条目，直接复制其产物
    CloneOf(MacroEntry),
}

/// 去重所用的原始 URL：请求里带了 original_url 就用它，否则用 url
pub fn dedup_key<'a>(url: &'a str, original_url: Option<&'a str>) -> &'a str {
    original_url.filter(|u| !u.is_empty()).unwrap_or(url)
}

/// 名字冲突快速失败 + 原始 URL 复用检测
///
/// 名字唯一性最终由插入时的主键冲突保证，这里只是在网络操作前提前拒绝。
pub async fn resolve_duplicates(
    storage: &SeaOrmStorage,
    name: &str,
    original_url: &str,
) -> Result<DedupDecision> {
    if storage.get(name).await?.is_some() {
        return Err(MacrodexError::name_already_exists(format!(
            "macro '{}' already exists",
            name
        )));
    }

    match storage.find_by_original_url(original_url).await? {
        Some(existing) => {
            info!(
                "Macro '{}' reuses artifacts of '{}' (same original url)",
                name, existing.name
            );
            Ok(DedupDecision::CloneOf(existing))
        }
        None => Ok(DedupDecision::Fresh),
    }
}
