//! 外部有损压缩服务
//!
//! 服务端按 URL 拉取源图并返回压缩后的临时地址：`{"dest": "...", "dest_size": n}`。

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};
use ureq::Agent;

use crate::config::CompressionConfig;
use crate::errors::{MacrodexError, Result};
use crate::net::http_agent;

/// 压缩结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub url: String,
    pub size: u64,
}

#[async_trait]
pub trait ImageCompressor: Send + Sync {
    async fn compress(&self, source_url: &str) -> Result<CompressedImage>;
}

/// 失败时重试一次
pub async fn compress_with_retry(
    compressor: &dyn ImageCompressor,
    source_url: &str,
) -> Result<CompressedImage> {
    match compressor.compress(source_url).await {
        Ok(result) => Ok(result),
        Err(first) => {
            warn!("Compression of {} failed, retrying once: {}", source_url, first);
            compressor.compress(source_url).await
        }
    }
}

#[derive(Debug, Deserialize)]
struct CompressionResponse {
    dest: Option<String>,
    dest_size: Option<u64>,
    error: Option<serde_json::Value>,
    error_long: Option<String>,
}

impl CompressionResponse {
    fn into_result(self) -> Result<CompressedImage> {
        if let Some(error) = self.error {
            return Err(MacrodexError::transient(format!(
                "compression service error {}: {}",
                error,
                self.error_long.unwrap_or_default()
            )));
        }

        match (self.dest, self.dest_size) {
            (Some(url), Some(size)) if !url.is_empty() => Ok(CompressedImage { url, size }),
            _ => Err(MacrodexError::transient(
                "compression response has no destination",
            )),
        }
    }
}

/// resmush.it 兼容的压缩客户端
pub struct ResmushCompressor {
    agent: &'static Agent,
    api_url: String,
    quality: u8,
}

impl ResmushCompressor {
    pub fn new(config: &CompressionConfig, timeout_secs: u64) -> Self {
        Self {
            agent: http_agent(timeout_secs),
            api_url: config.api_url.clone(),
            quality: config.quality,
        }
    }

    fn request_url(&self, source_url: &str) -> Result<String> {
        let url = url::Url::parse_with_params(
            &self.api_url,
            &[("img", source_url), ("qlty", &self.quality.to_string())],
        )
        .map_err(|e| MacrodexError::config(format!("invalid compression api url: {}", e)))?;
        Ok(url.to_string())
    }

    fn compress_sync(agent: &Agent, request_url: &str) -> Result<CompressedImage> {
        let resp = agent
            .get(request_url)
            .call()
            .map_err(|e| MacrodexError::transient(format!("compression request failed: {}", e)))?;

        let status = resp.status().as_u16();
        if status >= 400 {
            return Err(MacrodexError::transient(format!(
                "compression service returned HTTP {}",
                status
            )));
        }

        let body: CompressionResponse = resp
            .into_body()
            .read_json()
            .map_err(|e| MacrodexError::transient(format!("bad compression response: {}", e)))?;

        body.into_result()
    }
}

#[async_trait]
impl ImageCompressor for ResmushCompressor {
    async fn compress(&self, source_url: &str) -> Result<CompressedImage> {
        let request_url = self.request_url(source_url)?;
        let agent = self.agent;

        let result = tokio::task::spawn_blocking(move || Self::compress_sync(agent, &request_url))
            .await
            .map_err(|e| MacrodexError::transient(format!("compression task failed: {}", e)))??;

        debug!("Compressed {} -> {} ({} bytes)", source_url, result.url, result.size);
        Ok(result)
    }
}
