use tracing::{debug, warn};

use super::{ThumbnailSet, ThumbnailSynthesizer, resize, run_blocking};
use crate::errors::Result;

impl ThumbnailSynthesizer {
    pub(super) async fn synthesize_animated(&self, url: &str) -> Result<ThumbnailSet> {
        let settings = &self.settings;
        let (edge, quality) = (settings.edge, settings.jpeg_quality);
        let bytes = self.fetcher.fetch(url, settings.max_file_size).await?;
        let source_size = bytes.len() as u64;

        // 首帧合成到包围盒画布上作为静态预览；解码失败即永久错误
        let (animation, preview) = run_blocking(move || {
            let animation = resize::decode_gif(&bytes)?;
            let canvas = resize::composite_first_frame(&animation)?;
            let preview = resize::encode_jpeg(&resize::resize_to_edge(&canvas, edge), quality)?;
            Ok((animation, preview))
        })
        .await?;

        let (width, height) = (animation.width, animation.height);
        let preview = self.publisher.publish(preview, "jpeg").await?;

        let (animated_url, animated_size) = if source_size <= settings.animated_max_size {
            (Some(url.to_string()), Some(source_size))
        } else {
            match run_blocking(move || resize::reencode_gif(&animation, edge)).await {
                Ok(artifact) if artifact.size <= source_size => {
                    let published = self.publisher.publish(artifact, "gif").await?;
                    (Some(published.url), Some(published.size))
                }
                Ok(artifact) => {
                    debug!(
                        "Re-encoded {} is {} bytes, larger than source {}; dropping",
                        url, artifact.size, source_size
                    );
                    (None, None)
                }
                Err(e) => {
                    warn!("Re-encoding frames of {} failed: {}", url, e);
                    (None, None)
                }
            }
        };

        Ok(ThumbnailSet {
            source_size,
            thumbnail_url: preview.url,
            thumbnail_size: preview.size,
            is_animated: true,
            animated_url,
            animated_size,
            width: Some(width),
            height: Some(height),
        })
    }
}
