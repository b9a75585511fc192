//! 举报与重新校验
//!
//! 举报数达到阈值时完整下载并解码当前地址：解码失败或 4xx 则清除该宏，
//! 解码成功则把计数清零。网络抖动或 5xx 时计数保持不变，下一次举报会再次触发。

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{MacrodexError, Result};
use crate::net::{FetchError, MediaFetcher};
use crate::storage::SeaOrmStorage;

/// 举报处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// 计数 +1，未达阈值
    Counted(i64),
    /// 内容仍然有效，计数清零
    Revalidated,
    /// 内容失效，已清除
    Purged,
    /// 暂时无法校验，计数保留
    Deferred(i64),
}

/// 校验结论
#[derive(Debug, Clone, PartialEq, Eq)]
enum Verdict {
    Alive,
    Dead(String),
    Unknown(String),
}

pub struct ReportService {
    storage: Arc<SeaOrmStorage>,
    fetcher: Arc<dyn MediaFetcher>,
    threshold: i64,
    max_file_size: u64,
}

impl ReportService {
    pub fn new(
        storage: Arc<SeaOrmStorage>,
        fetcher: Arc<dyn MediaFetcher>,
        threshold: i64,
        max_file_size: u64,
    ) -> Self {
        Self {
            storage,
            fetcher,
            threshold,
            max_file_size,
        }
    }

    pub async fn report(&self, name: &str) -> Result<ReportOutcome> {
        if name.is_empty() {
            return Err(MacrodexError::missing_field("macro name is required"));
        }

        let count = self
            .storage
            .increment_reports(name)
            .await?
            .ok_or_else(|| MacrodexError::not_found(format!("macro '{}' not found", name)))?;

        if count < self.threshold {
            return Ok(ReportOutcome::Counted(count));
        }

        let entry = match self.storage.get(name).await? {
            Some(entry) => entry,
            None => return Err(MacrodexError::not_found(format!("macro '{}' not found", name))),
        };

        info!(
            "Macro '{}' reached {} reports, revalidating {}",
            name, count, entry.url
        );

        match self.verify(&entry.url).await {
            Verdict::Alive => {
                self.storage.reset_reports(name).await?;
                Ok(ReportOutcome::Revalidated)
            }
            Verdict::Dead(reason) => {
                warn!("Macro '{}' is dead ({}), purging", name, reason);
                self.storage.purge(name).await?;
                Ok(ReportOutcome::Purged)
            }
            Verdict::Unknown(reason) => {
                warn!("Revalidation of '{}' postponed: {}", name, reason);
                Ok(ReportOutcome::Deferred(count))
            }
        }
    }

    async fn verify(&self, url: &str) -> Verdict {
        let bytes = match self.fetcher.fetch(url, self.max_file_size).await {
            Ok(bytes) => bytes,
            Err(FetchError::Network(e)) => return Verdict::Unknown(e),
            Err(FetchError::Status(status)) if status >= 500 => {
                return Verdict::Unknown(format!("upstream returned {}", status));
            }
            Err(e) => return Verdict::Dead(e.to_string()),
        };

        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes).map(|_| ()))
            .await;

        match decoded {
            Ok(Ok(())) => Verdict::Alive,
            Ok(Err(e)) => Verdict::Dead(format!("decode failed: {}", e)),
            Err(e) => Verdict::Unknown(format!("decode task aborted: {}", e)),
        }
    }
}
