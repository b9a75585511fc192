//! 只读查询、使用次数与客户端错误日志

use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::MacrodexError;
use crate::storage::{
    ClientErrorReport, ClientErrorType, MacroRecord, Page, SeaOrmStorage, UsageTrigger,
};

/// 查询类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Search,
    Get,
    Suggestion,
}

impl QueryKind {
    /// 空字符串视为 suggestion
    pub fn parse(raw: &str) -> Result<Self, MacrodexError> {
        match raw {
            "search" => Ok(QueryKind::Search),
            "get" => Ok(QueryKind::Get),
            "" | "suggestion" => Ok(QueryKind::Suggestion),
            other => Err(MacrodexError::missing_field(format!(
                "unknown query type '{}'",
                other
            ))),
        }
    }
}

/// 查询结果；get 不分页，没有 has_more
#[derive(Debug, Clone)]
pub struct QueryResult {
    pub records: Vec<MacroRecord>,
    pub has_more: Option<bool>,
}

impl From<Page<MacroRecord>> for QueryResult {
    fn from(page: Page<MacroRecord>) -> Self {
        Self {
            records: page.items,
            has_more: Some(page.has_more),
        }
    }
}

pub struct CatalogService {
    storage: Arc<SeaOrmStorage>,
}

impl CatalogService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn query(
        &self,
        kind: QueryKind,
        text: &str,
        page: u64,
    ) -> Result<QueryResult, MacrodexError> {
        debug!("CatalogService: {:?} text='{}' page={}", kind, text, page);

        match kind {
            QueryKind::Search => Ok(self.storage.search(text, page).await?.into()),
            QueryKind::Suggestion => Ok(self.storage.suggestions(page).await?.into()),
            QueryKind::Get => {
                let names: Vec<String> = text
                    .split(',')
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string)
                    .collect();
                Ok(QueryResult {
                    records: self.storage.get_many(&names).await?,
                    has_more: None,
                })
            }
        }
    }

    pub async fn record_usage(&self, name: &str, trigger: &str) -> Result<(), MacrodexError> {
        if name.is_empty() || trigger.is_empty() {
            return Err(MacrodexError::missing_field("name and trigger are required"));
        }

        let trigger = UsageTrigger::from_str(trigger).map_err(|_| {
            MacrodexError::missing_field(format!("unknown usage trigger '{}'", trigger))
        })?;

        if !self.storage.record_usage(name, trigger).await? {
            return Err(MacrodexError::not_found(format!("macro '{}' not found", name)));
        }

        debug!("CatalogService: usage '{}' +1 {}", name, trigger.as_ref());
        Ok(())
    }

    pub async fn log_client_error(
        &self,
        version: &str,
        error_type: &str,
        stacktrace: &str,
    ) -> Result<(), MacrodexError> {
        if version.is_empty() || error_type.is_empty() || stacktrace.is_empty() {
            return Err(MacrodexError::missing_field(
                "version, type and stacktrace are required",
            ));
        }

        let error_type = ClientErrorType::from_str(error_type).map_err(|_| {
            MacrodexError::missing_field(format!("unknown client error type '{}'", error_type))
        })?;

        self.storage
            .insert_client_error(&ClientErrorReport {
                client_version: version.to_string(),
                error_type,
                stacktrace: stacktrace.to_string(),
            })
            .await?;

        info!("CatalogService: client error logged ({} {})", version, error_type.as_ref());
        Ok(())
    }
}
