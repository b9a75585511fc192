//! 集成测试共用的桩实现与构造函数
#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgba, RgbaImage};
use tempfile::TempDir;

use macrodex::blob::{FilesystemBlobStore, Publisher};
use macrodex::config::{IngestConfig, init_config};
use macrodex::errors::{MacrodexError, Result};
use macrodex::ingest::{
    CompressedImage, ImageCompressor, IngestPipeline, MemoryQueue, PipelineSettings, RehostSignal,
    Rehoster, SignalQueue, ThumbnailSettings, ThumbnailSynthesizer,
};
use macrodex::net::{FetchError, MediaFetcher, ProbeResponse};
use macrodex::storage::SeaOrmStorage;

static INIT: Once = Once::new();

pub fn init_test_config() {
    INIT.call_once(|| {
        init_config();
    });
}

/// 临时 SQLite 存储；TempDir 需要和存储同生命周期
pub async fn create_temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_test_config();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!("sqlite://{}?mode=rwc", temp_dir.path().join("test.db").display());

    let storage = SeaOrmStorage::new(&db_url, "sqlite")
        .await
        .expect("Failed to create storage");

    (Arc::new(storage), temp_dir)
}

// =============================================================================
// 媒体样本
// =============================================================================

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// xorshift 伪随机数
fn noise(seed: u32) -> impl FnMut() -> u32 {
    let mut state = seed;
    move || {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        state
    }
}

/// 伪随机像素，压缩率很差
pub fn noisy_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut next = noise(0x9e37_79b9);
    let img = RgbaImage::from_fn(width, height, |_, _| {
        let v = next();
        Rgba([v as u8, (v >> 8) as u8, (v >> 16) as u8, 255])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, ImageFormat::Png).unwrap();
    out.into_inner()
}

/// 带 PNG 魔数的垃圾数据，能通过探测但无法解码
pub fn corrupt_png_bytes(len: usize) -> Vec<u8> {
    let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
    bytes.resize(len, 0xAB);
    bytes
}

/// 伪随机像素的动图
pub fn noisy_gif_bytes(width: u16, height: u16, frames: usize) -> Vec<u8> {
    let mut next = noise(0x2545_f491);

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
        encoder.set_repeat(gif::Repeat::Infinite).unwrap();
        for _ in 0..frames {
            let mut pixels: Vec<u8> = Vec::with_capacity(width as usize * height as usize * 4);
            for _ in 0..(width as usize * height as usize) {
                let v = next();
                pixels.extend_from_slice(&[v as u8, (v >> 8) as u8, (v >> 16) as u8, 255]);
            }
            let mut frame = gif::Frame::from_rgba_speed(width, height, &mut pixels, 30);
            frame.delay = 10;
            encoder.write_frame(&frame).unwrap();
        }
    }
    out
}

/// 纯色小动图
pub fn tiny_gif_bytes(frames: usize) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, 4, 4, &[]).unwrap();
        for i in 0..frames {
            let shade = (i * 60 % 256) as u8;
            let mut pixels = [shade, 0, 255 - shade, 255].repeat(16);
            let mut frame = gif::Frame::from_rgba_speed(4, 4, &mut pixels, 30);
            frame.delay = 5;
            encoder.write_frame(&frame).unwrap();
        }
    }
    out
}

// =============================================================================
// 抓取桩
// =============================================================================

/// 按 URL 返回预设内容，并统计调用次数
#[derive(Default)]
pub struct MockFetcher {
    responses: Mutex<HashMap<String, std::result::Result<Bytes, FetchError>>>,
    probes: AtomicUsize,
    fetches: AtomicUsize,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serve(&self, url: &str, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Ok(Bytes::from(body)));
    }

    pub fn fail(&self, url: &str, err: FetchError) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(err));
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn network_calls(&self) -> usize {
        self.probe_count() + self.fetch_count()
    }

    fn lookup(&self, url: &str) -> std::result::Result<Bytes, FetchError> {
        self.responses
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or(Err(FetchError::Status(404)))
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn probe(
        &self,
        url: &str,
        probe_bytes: u64,
    ) -> std::result::Result<ProbeResponse, FetchError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        match self.lookup(url) {
            Ok(body) => {
                let total = body.len() as u64;
                let read = total.min(probe_bytes);
                Ok(ProbeResponse {
                    status: 206,
                    content_range: Some(format!("bytes 0-{}/{}", read.saturating_sub(1), total)),
                    content_length: Some(read.to_string()),
                    prefix: body.slice(0..read as usize),
                })
            }
            Err(FetchError::Status(status)) => Ok(ProbeResponse {
                status,
                ..Default::default()
            }),
            Err(e) => Err(e),
        }
    }

    async fn fetch(&self, url: &str, limit: u64) -> std::result::Result<Bytes, FetchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let body = self.lookup(url)?;
        if body.len() as u64 > limit {
            return Err(FetchError::TooLarge(limit));
        }
        Ok(body)
    }
}

// =============================================================================
// 压缩 / 重托管 / 队列桩
// =============================================================================

pub struct MockCompressor {
    result: Option<CompressedImage>,
    calls: AtomicUsize,
}

impl MockCompressor {
    pub fn returning(url: &str, size: u64) -> Self {
        Self {
            result: Some(CompressedImage {
                url: url.to_string(),
                size,
            }),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            result: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageCompressor for MockCompressor {
    async fn compress(&self, _source_url: &str) -> Result<CompressedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .ok_or_else(|| MacrodexError::transient("compression service down"))
    }
}

/// 返回自托管域名下的新地址
#[derive(Default)]
pub struct MockRehoster {
    calls: AtomicUsize,
    fail: bool,
}

impl MockRehoster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Rehoster for MockRehoster {
    async fn rehost(&self, _temp_url: &str) -> Result<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(MacrodexError::transient("gist api unavailable"));
        }
        Ok(format!(
            "https://user-images.githubusercontent.com/rehosted/{}.png",
            n
        ))
    }
}

/// 发送永远失败的队列
#[derive(Default)]
pub struct FailingQueue {
    emits: AtomicUsize,
}

impl FailingQueue {
    pub fn emits(&self) -> usize {
        self.emits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SignalQueue for FailingQueue {
    async fn emit(&self, _signal: &RehostSignal) -> Result<()> {
        self.emits.fetch_add(1, Ordering::SeqCst);
        Err(MacrodexError::queue("broker unreachable"))
    }

    async fn next(&self) -> Result<Option<RehostSignal>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "failing"
    }
}

// =============================================================================
// 组装
// =============================================================================

pub fn pipeline_settings() -> PipelineSettings {
    PipelineSettings::from(&IngestConfig::default())
}

pub fn thumbnail_settings() -> ThumbnailSettings {
    ThumbnailSettings::from(&IngestConfig::default())
}

pub fn publisher(blob_dir: &TempDir) -> Publisher {
    let store = FilesystemBlobStore::new(
        blob_dir.path().to_str().unwrap(),
        "http://127.0.0.1:8080/blobs",
    )
    .unwrap();
    Publisher::new(Arc::new(store))
}

pub fn synthesizer(
    fetcher: Arc<MockFetcher>,
    compressor: Option<Arc<MockCompressor>>,
    blob_dir: &TempDir,
    settings: ThumbnailSettings,
) -> ThumbnailSynthesizer {
    ThumbnailSynthesizer::new(
        fetcher,
        compressor.map(|c| c as Arc<dyn ImageCompressor>),
        publisher(blob_dir),
        settings,
    )
}

/// 一套完整的入库环境
pub struct Harness {
    pub storage: Arc<SeaOrmStorage>,
    pub fetcher: Arc<MockFetcher>,
    pub rehoster: Arc<MockRehoster>,
    pub queue: Arc<dyn SignalQueue>,
    pub pipeline: Arc<IngestPipeline>,
    _db_dir: TempDir,
    pub blob_dir: TempDir,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_parts(Arc::new(MemoryQueue::new(16)), Arc::new(MockRehoster::new())).await
    }

    pub async fn with_queue(queue: Arc<dyn SignalQueue>) -> Self {
        Self::with_parts(queue, Arc::new(MockRehoster::new())).await
    }

    pub async fn with_parts(queue: Arc<dyn SignalQueue>, rehoster: Arc<MockRehoster>) -> Self {
        let (storage, db_dir) = create_temp_storage().await;
        let blob_dir = TempDir::new().unwrap();
        let fetcher = Arc::new(MockFetcher::new());

        let synth = synthesizer(fetcher.clone(), None, &blob_dir, thumbnail_settings());
        let pipeline = Arc::new(IngestPipeline::new(
            storage.clone(),
            fetcher.clone(),
            synth,
            rehoster.clone(),
            queue.clone(),
            pipeline_settings(),
        ));

        Self {
            storage,
            fetcher,
            rehoster,
            queue,
            pipeline,
            _db_dir: db_dir,
            blob_dir,
        }
    }
}
