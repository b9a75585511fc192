//! 内容探测：区间请求拿到总大小与格式，不下载完整内容

use std::io::Cursor;

use image::{ImageFormat, ImageReader};
use tracing::debug;

use crate::errors::{MacrodexError, Result};
use crate::net::{FetchError, MediaFetcher, ProbeResponse};

/// 允许的媒体格式
pub const SUPPORTED_FORMATS: [ImageFormat; 4] = [
    ImageFormat::Gif,
    ImageFormat::Png,
    ImageFormat::Bmp,
    ImageFormat::Jpeg,
];

/// 探测结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbedContent {
    pub size: u64,
    pub format: ImageFormat,
    /// 从头部解析出的宽高；JPEG 的 SOF 可能不在前缀里，拿不到时为 None
    pub dimensions: Option<(u32, u32)>,
}

impl ProbedContent {
    pub fn is_animated(&self) -> bool {
        self.format == ImageFormat::Gif
    }
}

/// 计算资源总大小
///
/// 优先 `Content-Range` 的总长度；其次 `Content-Length` 与实际读取长度中的较大者；
/// 两者都不可用时退回实际读取长度。
pub fn resolve_content_size(
    content_range: Option<&str>,
    content_length: Option<&str>,
    received: u64,
) -> u64 {
    if let Some(total) = content_range
        .and_then(|range| range.split_once('/'))
        .and_then(|(_, total)| total.trim().parse::<u64>().ok())
    {
        return total;
    }

    if let Some(length) = content_length.and_then(|len| len.trim().parse::<u64>().ok()) {
        return length.max(received);
    }

    received
}

/// 根据探测响应判定大小与格式
pub fn inspect(probe: &ProbeResponse, max_file_size: u64) -> Result<ProbedContent> {
    if probe.status >= 400 {
        return Err(MacrodexError::invalid_url(format!(
            "probe returned HTTP {}",
            probe.status
        )));
    }

    let size = resolve_content_size(
        probe.content_range.as_deref(),
        probe.content_length.as_deref(),
        probe.prefix.len() as u64,
    );

    if size > max_file_size {
        return Err(MacrodexError::file_too_big(format!(
            "file size {} exceeds limit {}",
            size, max_file_size
        )));
    }

    let format = image::guess_format(&probe.prefix)
        .ok()
        .filter(|f| SUPPORTED_FORMATS.contains(f))
        .ok_or_else(|| MacrodexError::unsupported_format("unsupported media type"))?;

    let dimensions = ImageReader::with_format(Cursor::new(&probe.prefix[..]), format)
        .into_dimensions()
        .ok();

    Ok(ProbedContent {
        size,
        format,
        dimensions,
    })
}

/// 发起区间请求并判定
///
/// 网络失败统一归为 InvalidUrl，不重试。
pub async fn probe_content(
    fetcher: &dyn MediaFetcher,
    url: &str,
    probe_bytes: u64,
    max_file_size: u64,
) -> Result<ProbedContent> {
    let probe = fetcher
        .probe(url, probe_bytes)
        .await
        .map_err(|e: FetchError| MacrodexError::invalid_url(format!("{}: {}", url, e)))?;

    let probed = inspect(&probe, max_file_size)?;
    debug!(
        "Probed {}: {} bytes, {:?}",
        url, probed.size, probed.format
    );
    Ok(probed)
}
