use tracing::{debug, warn};

use super::{ThumbnailSet, ThumbnailSynthesizer, resize, run_blocking};
use crate::blob::EncodedArtifact;
use crate::errors::{MacrodexError, Result};
use crate::ingest::compressor::{CompressedImage, compress_with_retry};

/// 静态图最终采用的缩略图来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StillChoice {
    Original,
    Compressed,
    Resized,
}

/// 兜底选择：候选需不大于源文件且不超过 fallback 预算，取较小者；
/// 都不满足时源文件本身不超过 fallback 预算则用原图，否则返回 None
pub fn choose_still(
    source_size: u64,
    compressed: Option<u64>,
    resized: Option<u64>,
    fallback_max: u64,
) -> Option<StillChoice> {
    let fits = |size: &u64| *size <= source_size && *size <= fallback_max;

    match (compressed.filter(fits), resized.filter(fits)) {
        (Some(c), Some(r)) if c < r => Some(StillChoice::Compressed),
        (_, Some(_)) => Some(StillChoice::Resized),
        (Some(_), None) => Some(StillChoice::Compressed),
        (None, None) if source_size <= fallback_max => Some(StillChoice::Original),
        (None, None) => None,
    }
}

struct Resized {
    artifact: EncodedArtifact,
    source_size: u64,
    width: u32,
    height: u32,
}

impl ThumbnailSynthesizer {
    pub(super) async fn synthesize_still(&self, url: &str, probed_size: u64) -> Result<ThumbnailSet> {
        let settings = &self.settings;

        if probed_size <= settings.thumbnail_max_size {
            debug!("{} fits the thumbnail budget, using original", url);
            return Ok(ThumbnailSet::still(probed_size, url.to_string(), probed_size));
        }

        let compressed = self.try_compress(url).await;
        if let Some(c) = compressed.as_ref().filter(|c| c.size <= settings.fallback_max_size) {
            debug!("{} compressed to {} bytes", url, c.size);
            return Ok(ThumbnailSet::still(probed_size, c.url.clone(), c.size));
        }

        let (resized, resize_err) = match self.resize_remote(url).await {
            Ok(resized) => (Some(resized), None),
            Err(e) => {
                warn!("Resizing {} failed: {}", url, e);
                (None, Some(e))
            }
        };

        let source_size = resized.as_ref().map_or(probed_size, |r| r.source_size);
        let choice = choose_still(
            source_size,
            compressed.as_ref().map(|c| c.size),
            resized.as_ref().map(|r| r.artifact.size),
            settings.fallback_max_size,
        );

        match (choice, resized, compressed) {
            (Some(StillChoice::Resized), Some(r), _) => {
                let published = self.publisher.publish(r.artifact, "jpeg").await?;
                Ok(ThumbnailSet::still(source_size, published.url, published.size)
                    .with_dimensions(r.width, r.height))
            }
            (Some(StillChoice::Compressed), resized, Some(c)) => {
                let set = ThumbnailSet::still(source_size, c.url, c.size);
                Ok(match resized {
                    Some(r) => set.with_dimensions(r.width, r.height),
                    None => set,
                })
            }
            (Some(StillChoice::Original), resized, _) => {
                let set = ThumbnailSet::still(source_size, url.to_string(), source_size);
                Ok(match resized {
                    Some(r) => set.with_dimensions(r.width, r.height),
                    None => set,
                })
            }
            _ => match resize_err {
                Some(e) if e.is_transient() => Err(e),
                Some(e) => Err(MacrodexError::permanent_content(format!(
                    "no thumbnail within budget for {}: {}",
                    url, e
                ))),
                None => Err(MacrodexError::permanent_content(format!(
                    "no thumbnail within {} bytes for {}",
                    settings.fallback_max_size, url
                ))),
            },
        }
    }

    async fn try_compress(&self, url: &str) -> Option<CompressedImage> {
        let compressor = self.compressor.as_ref()?;
        match compress_with_retry(compressor.as_ref(), url).await {
            Ok(result) => Some(result),
            Err(e) => {
                warn!("Compression of {} unavailable: {}", url, e);
                None
            }
        }
    }

    async fn resize_remote(&self, url: &str) -> Result<Resized> {
        let bytes = self.fetcher.fetch(url, self.settings.max_file_size).await?;
        let source_size = bytes.len() as u64;
        let (edge, quality) = (self.settings.edge, self.settings.jpeg_quality);

        let (artifact, width, height) =
            run_blocking(move || resize::still_thumbnail(&bytes, edge, quality)).await?;

        Ok(Resized {
            artifact,
            source_size,
            width,
            height,
        })
    }
}
