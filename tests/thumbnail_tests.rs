//! Thumbnail synthesis tests

mod common;

use std::sync::Arc;

use macrodex::errors::ErrorKind;
use macrodex::ingest::ThumbnailSettings;
use macrodex::net::FetchError;
use tempfile::TempDir;

use common::{
    MockCompressor, MockFetcher, noisy_gif_bytes, noisy_png_bytes, synthesizer,
    thumbnail_settings, tiny_gif_bytes,
};

const BLOB_BASE: &str = "http://127.0.0.1:8080/blobs/";
const STILL_URL: &str = "https://img.example.com/big.png";
const GIF_URL: &str = "https://img.example.com/party.gif";

// =============================================================================
// 静态图
// =============================================================================

#[tokio::test]
async fn test_still_within_budget_uses_original() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let compressor = Arc::new(MockCompressor::returning("https://tmp.example.com/c.png", 10));
    let synth = synthesizer(
        fetcher.clone(),
        Some(compressor.clone()),
        &blob_dir,
        thumbnail_settings(),
    );

    let set = synth.synthesize(STILL_URL, 100 * 1024, false).await.unwrap();
    assert_eq!(set.thumbnail_url, STILL_URL);
    assert_eq!(set.thumbnail_size, 100 * 1024);
    assert!(!set.is_animated);
    assert_eq!(compressor.calls(), 0);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_still_compressed_within_fallback() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let compressor = Arc::new(MockCompressor::returning(
        "https://tmp.example.com/compressed.png",
        600 * 1024,
    ));
    let synth = synthesizer(
        fetcher.clone(),
        Some(compressor.clone()),
        &blob_dir,
        thumbnail_settings(),
    );

    let set = synth.synthesize(STILL_URL, 900 * 1024, false).await.unwrap();
    assert_eq!(set.thumbnail_url, "https://tmp.example.com/compressed.png");
    assert_eq!(set.thumbnail_size, 600 * 1024);
    assert_eq!(set.source_size, 900 * 1024);
    assert_eq!(compressor.calls(), 1);
    assert_eq!(fetcher.fetch_count(), 0);
}

#[tokio::test]
async fn test_still_resize_when_compression_too_large() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let body = noisy_png_bytes(300, 200);
    let body_len = body.len() as u64;
    fetcher.serve(STILL_URL, body);

    let compressor = Arc::new(MockCompressor::returning(
        "https://tmp.example.com/huge.png",
        4 * 1024 * 1024,
    ));
    let synth = synthesizer(
        fetcher.clone(),
        Some(compressor.clone()),
        &blob_dir,
        thumbnail_settings(),
    );

    // 探测大小大于预算，实际大小以下载字节数为准
    let set = synth.synthesize(STILL_URL, 5 * 1024 * 1024, false).await.unwrap();
    assert!(set.thumbnail_url.starts_with(BLOB_BASE));
    assert!(set.thumbnail_url.ends_with(".jpeg"));
    assert_eq!(set.source_size, body_len);
    assert!(set.thumbnail_size > 0 && set.thumbnail_size <= body_len);
    assert_eq!((set.width, set.height), (Some(150), Some(100)));
    assert_eq!(fetcher.fetch_count(), 1);

    // 发布的文件大小与记录一致
    let key = set.thumbnail_url.trim_start_matches(BLOB_BASE);
    let written = std::fs::metadata(blob_dir.path().join(key)).unwrap().len();
    assert_eq!(written, set.thumbnail_size);
}

#[tokio::test]
async fn test_still_choice_is_deterministic() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.serve(STILL_URL, noisy_png_bytes(240, 240));
    let compressor = Arc::new(MockCompressor::failing());
    let synth = synthesizer(
        fetcher.clone(),
        Some(compressor.clone()),
        &blob_dir,
        thumbnail_settings(),
    );

    let first = synth.synthesize(STILL_URL, 2 * 1024 * 1024, false).await.unwrap();
    let second = synth.synthesize(STILL_URL, 2 * 1024 * 1024, false).await.unwrap();
    assert_eq!(first.thumbnail_size, second.thumbnail_size);
    assert_eq!((first.width, first.height), (second.width, second.height));
    assert_ne!(first.thumbnail_url, second.thumbnail_url);

    // 压缩失败重试一次，两次合成共四次调用
    assert_eq!(compressor.calls(), 4);
}

#[tokio::test]
async fn test_still_network_failure_is_transient() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.fail(STILL_URL, FetchError::Network("timed out".to_string()));
    let synth = synthesizer(fetcher, None, &blob_dir, thumbnail_settings());

    let err = synth
        .synthesize(STILL_URL, 3 * 1024 * 1024, false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transient);
}

#[tokio::test]
async fn test_still_fetch_failure_within_fallback_keeps_original() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    fetcher.fail(STILL_URL, FetchError::Status(500));
    let synth = synthesizer(fetcher, None, &blob_dir, thumbnail_settings());

    let set = synth.synthesize(STILL_URL, 800 * 1024, false).await.unwrap();
    assert_eq!(set.thumbnail_url, STILL_URL);
    assert_eq!(set.thumbnail_size, 800 * 1024);
}

// =============================================================================
// 动图
// =============================================================================

#[tokio::test]
async fn test_animated_within_budget_keeps_original() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let body = tiny_gif_bytes(3);
    let body_len = body.len() as u64;
    fetcher.serve(GIF_URL, body);
    let synth = synthesizer(fetcher.clone(), None, &blob_dir, thumbnail_settings());

    let set = synth.synthesize(GIF_URL, body_len, true).await.unwrap();
    assert!(set.is_animated);
    assert_eq!(set.animated_url.as_deref(), Some(GIF_URL));
    assert_eq!(set.animated_size, Some(body_len));
    assert!(set.thumbnail_url.starts_with(BLOB_BASE));
    assert!(set.thumbnail_url.ends_with(".jpeg"));
    assert!(set.thumbnail_size > 0);
    assert_eq!((set.width, set.height), (Some(4), Some(4)));
    assert_eq!(fetcher.fetch_count(), 1);
}

#[tokio::test]
async fn test_animated_reencode_larger_than_source_is_dropped() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let body = tiny_gif_bytes(2);
    let body_len = body.len() as u64;
    fetcher.serve(GIF_URL, body);

    // 预算极小，强制走重编码；4x4 放大到 150x150 后必然比源文件大
    let settings = ThumbnailSettings {
        animated_max_size: 10,
        ..thumbnail_settings()
    };
    let synth = synthesizer(fetcher, None, &blob_dir, settings);

    let set = synth.synthesize(GIF_URL, body_len, true).await.unwrap();
    assert!(set.animated_url.is_none());
    assert!(set.animated_size.is_none());
    assert!(!set.thumbnail_url.is_empty());
    assert!(set.thumbnail_size > 0);
}

#[tokio::test]
async fn test_animated_reencode_smaller_is_published() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let body = noisy_gif_bytes(300, 300, 2);
    let body_len = body.len() as u64;
    fetcher.serve(GIF_URL, body);

    let settings = ThumbnailSettings {
        animated_max_size: 1024,
        ..thumbnail_settings()
    };
    let synth = synthesizer(fetcher, None, &blob_dir, settings);

    let set = synth.synthesize(GIF_URL, body_len, true).await.unwrap();
    let animated = set.animated_url.expect("re-encoded variant");
    assert!(animated.starts_with(BLOB_BASE));
    assert!(animated.ends_with(".gif"));
    let size = set.animated_size.unwrap();
    assert!(size > 0 && size <= body_len);
    assert_eq!((set.width, set.height), (Some(300), Some(300)));
}

#[tokio::test]
async fn test_animated_garbage_is_permanent() {
    let blob_dir = TempDir::new().unwrap();
    let fetcher = Arc::new(MockFetcher::new());
    let mut body = b"GIF89a".to_vec();
    body.extend_from_slice(&[0xFF; 64]);
    fetcher.serve(GIF_URL, body);
    let synth = synthesizer(fetcher, None, &blob_dir, thumbnail_settings());

    let err = synth.synthesize(GIF_URL, 70, true).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Permanent);
}
