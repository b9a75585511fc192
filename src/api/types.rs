//! API 类型定义

use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_more: Option<bool>,
}

/// `POST /add`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct AddParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub original_url: Option<String>,
}

/// `GET /query`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct QueryParams {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
    /// 非法页码按 0 处理
    #[serde(default)]
    pub page: Option<String>,
}

impl QueryParams {
    pub fn page_number(&self) -> u64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// `POST /usage`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct UsageParams {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub trigger: String,
}

/// `POST /report`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ReportParams {
    #[serde(default)]
    pub name: String,
}

/// `POST /client_error`
#[derive(Deserialize, Clone, Debug, Default)]
pub struct ClientErrorParams {
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default)]
    pub error_type: String,
    #[serde(default)]
    pub stacktrace: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub storage_type: String,
    pub macros: Option<u64>,
    pub uptime_secs: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
