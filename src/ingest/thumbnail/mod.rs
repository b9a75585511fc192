//! 缩略图合成
//!
//! 静态图与动图走不同分支，产物都通过 [`Publisher`] 发布到公开对象存储。

mod animated;
pub mod resize;
mod still;

use std::sync::Arc;

use crate::blob::Publisher;
use crate::config::IngestConfig;
use crate::errors::{MacrodexError, Result};
use crate::ingest::compressor::ImageCompressor;
use crate::net::MediaFetcher;

pub use still::{StillChoice, choose_still};

/// 合成所需的预算与参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSettings {
    pub max_file_size: u64,
    pub thumbnail_max_size: u64,
    pub fallback_max_size: u64,
    pub animated_max_size: u64,
    pub edge: u32,
    pub jpeg_quality: u8,
}

impl From<&IngestConfig> for ThumbnailSettings {
    fn from(config: &IngestConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
            thumbnail_max_size: config.thumbnail_max_size,
            fallback_max_size: config.thumbnail_fallback_max_size,
            animated_max_size: config.animated_thumbnail_max_size,
            edge: config.thumbnail_edge,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// 合成结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailSet {
    /// 源文件大小；完整下载过时为实际字节数
    pub source_size: u64,
    pub thumbnail_url: String,
    pub thumbnail_size: u64,
    pub is_animated: bool,
    pub animated_url: Option<String>,
    pub animated_size: Option<u64>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ThumbnailSet {
    fn still(source_size: u64, thumbnail_url: String, thumbnail_size: u64) -> Self {
        Self {
            source_size,
            thumbnail_url,
            thumbnail_size,
            is_animated: false,
            animated_url: None,
            animated_size: None,
            width: None,
            height: None,
        }
    }

    fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }
}

pub struct ThumbnailSynthesizer {
    fetcher: Arc<dyn MediaFetcher>,
    compressor: Option<Arc<dyn ImageCompressor>>,
    publisher: Publisher,
    settings: ThumbnailSettings,
}

impl ThumbnailSynthesizer {
    /// `compressor` 为 None 时跳过外部压缩
    pub fn new(
        fetcher: Arc<dyn MediaFetcher>,
        compressor: Option<Arc<dyn ImageCompressor>>,
        publisher: Publisher,
        settings: ThumbnailSettings,
    ) -> Self {
        Self {
            fetcher,
            compressor,
            publisher,
            settings,
        }
    }

    pub fn settings(&self) -> &ThumbnailSettings {
        &self.settings
    }

    /// `source_size` 为探测到的大小，动图分支会以完整下载的实际大小为准
    pub async fn synthesize(&self, url: &str, source_size: u64, animated: bool) -> Result<ThumbnailSet> {
        if animated {
            self.synthesize_animated(url).await
        } else {
            self.synthesize_still(url, source_size).await
        }
    }
}

/// 在阻塞线程池中执行解码/编码
async fn run_blocking<T, F>(task: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| MacrodexError::transient(format!("image task aborted: {}", e)))?
}
