//! 媒体抓取
//!
//! ureq 是同步客户端，所有请求都放进 spawn_blocking 执行。

use std::fmt;
use std::io::Read;
use std::sync::OnceLock;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, trace};
use ureq::Agent;

use crate::errors::MacrodexError;

static HTTP_AGENT: OnceLock<Agent> = OnceLock::new();

/// 全局 HTTP Agent（ureq 的 Agent 是 Send + Sync）
///
/// 状态码不作为错误返回，由调用方自行判断。超时只在第一次调用时生效。
pub fn http_agent(timeout_secs: u64) -> &'static Agent {
    HTTP_AGENT.get_or_init(|| {
        Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(timeout_secs)))
            .http_status_as_error(false)
            .build()
            .into()
    })
}

/// 抓取失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// 连接失败、超时、读取中断
    Network(String),
    /// 服务端返回了错误状态码
    Status(u16),
    /// 响应体超过读取上限
    TooLarge(u64),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Network(msg) => write!(f, "network error: {}", msg),
            FetchError::Status(code) => write!(f, "unexpected HTTP status {}", code),
            FetchError::TooLarge(limit) => write!(f, "response body exceeds {} bytes", limit),
        }
    }
}

impl std::error::Error for FetchError {}

impl From<FetchError> for MacrodexError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Network(_) => MacrodexError::transient(err.to_string()),
            FetchError::Status(_) | FetchError::TooLarge(_) => {
                MacrodexError::permanent_content(err.to_string())
            }
        }
    }
}

/// 区间请求的结果
#[derive(Debug, Clone, Default)]
pub struct ProbeResponse {
    pub status: u16,
    pub content_range: Option<String>,
    pub content_length: Option<String>,
    /// 响应体前缀（最多 probe_bytes 字节）
    pub prefix: Bytes,
}

#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// 发送 `Range: bytes=0-{n-1}` 请求，只读取前 n 字节
    async fn probe(&self, url: &str, probe_bytes: u64) -> Result<ProbeResponse, FetchError>;

    /// 完整下载，超过 limit 字节即失败
    async fn fetch(&self, url: &str, limit: u64) -> Result<Bytes, FetchError>;
}

/// 基于 ureq 的实现
pub struct UreqFetcher {
    agent: &'static Agent,
}

impl UreqFetcher {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            agent: http_agent(timeout_secs),
        }
    }

    fn probe_sync(agent: &Agent, url: &str, probe_bytes: u64) -> Result<ProbeResponse, FetchError> {
        let range = format!("bytes=0-{}", probe_bytes.saturating_sub(1));
        let resp = agent
            .get(url)
            .header("Range", &range)
            .call()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let header = |name: &str| {
            resp.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        let content_range = header("Content-Range");
        let content_length = header("Content-Length");

        let mut prefix = Vec::with_capacity(probe_bytes as usize);
        resp.into_body()
            .into_reader()
            .take(probe_bytes)
            .read_to_end(&mut prefix)
            .map_err(|e| FetchError::Network(e.to_string()))?;

        trace!(
            "Probe {} -> status {}, range {:?}, length {:?}, {} bytes read",
            url,
            status,
            content_range,
            content_length,
            prefix.len()
        );

        Ok(ProbeResponse {
            status,
            content_range,
            content_length,
            prefix: Bytes::from(prefix),
        })
    }

    fn fetch_sync(agent: &Agent, url: &str, limit: u64) -> Result<Bytes, FetchError> {
        let resp = agent
            .get(url)
            .call()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(FetchError::Status(status));
        }

        let body = resp
            .into_body()
            .with_config()
            .limit(limit)
            .read_to_vec()
            .map_err(|e| match e {
                ureq::Error::BodyExceedsLimit(_) => FetchError::TooLarge(limit),
                other => FetchError::Network(other.to_string()),
            })?;

        debug!("Fetched {} ({} bytes)", url, body.len());
        Ok(Bytes::from(body))
    }
}

#[async_trait]
impl MediaFetcher for UreqFetcher {
    async fn probe(&self, url: &str, probe_bytes: u64) -> Result<ProbeResponse, FetchError> {
        let agent = self.agent;
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::probe_sync(agent, &url, probe_bytes))
            .await
            .map_err(|e| FetchError::Network(format!("probe task failed: {}", e)))?
    }

    async fn fetch(&self, url: &str, limit: u64) -> Result<Bytes, FetchError> {
        let agent = self.agent;
        let url = url.to_string();
        tokio::task::spawn_blocking(move || Self::fetch_sync(agent, &url, limit))
            .await
            .map_err(|e| FetchError::Network(format!("fetch task failed: {}", e)))?
    }
}
