//! 启动装配：存储、对象存储、抓取器、流水线与各服务

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::blob::{Publisher, create_blob_store};
use crate::config::{AppConfig, BlobBackend, get_config};
use crate::ingest::rehost::create_signal_queue;
use crate::ingest::{
    GistRehoster, ImageCompressor, IngestPipeline, PassthroughRehoster, PipelineSettings,
    Rehoster, ResmushCompressor, RehostWorker, SignalQueue, ThumbnailSettings,
    ThumbnailSynthesizer,
};
use crate::net::{MediaFetcher, UreqFetcher};
use crate::services::{CatalogService, IngestService, ReportService};
use crate::storage::{SeaOrmStorage, StorageFactory};

pub struct StartupContext {
    pub storage: Arc<SeaOrmStorage>,
    pub queue: Arc<dyn SignalQueue>,
    pub pipeline: Arc<IngestPipeline>,
    pub ingest_service: Arc<IngestService>,
    pub catalog_service: Arc<CatalogService>,
    pub report_service: Arc<ReportService>,
    /// 文件系统对象存储时由 HTTP 服务直接提供 `/blobs/{key}`
    pub blob_root: Option<PathBuf>,
    pub deadline_secs: u64,
}

impl StartupContext {
    pub fn worker(&self) -> RehostWorker {
        RehostWorker::new(self.pipeline.clone(), self.deadline_secs)
    }
}

fn build_rehoster(config: &AppConfig, storage: &Arc<SeaOrmStorage>) -> Arc<dyn Rehoster> {
    if !config.rehost.enabled {
        info!("Rehosting disabled, artifacts stay on the blob store");
        return Arc::new(PassthroughRehoster);
    }

    if config.rehost.github_token.is_empty() {
        warn!("rehost.github_token is empty, gist API calls will be rejected");
    }

    Arc::new(GistRehoster::new(
        storage.clone(),
        config.rehost.clone(),
        config.ingest.http_timeout_secs,
    ))
}

/// 准备运行上下文
pub async fn prepare_startup() -> Result<StartupContext> {
    let start_time = std::time::Instant::now();
    debug!("Starting pre-startup processing...");

    let config = get_config();

    let storage = StorageFactory::create()
        .await
        .context("Failed to create storage backend")?;
    info!(
        "Using storage backend: {}",
        storage.get_backend_config().storage_type
    );

    let blob_store = create_blob_store(&config.blob)
        .await
        .context("Failed to create blob store")?;
    info!("Using blob store: {}", blob_store.name());

    let fetcher: Arc<dyn MediaFetcher> =
        Arc::new(UreqFetcher::new(config.ingest.http_timeout_secs));

    let compressor: Option<Arc<dyn ImageCompressor>> = if config.compression.enabled {
        Some(Arc::new(ResmushCompressor::new(
            &config.compression,
            config.ingest.http_timeout_secs,
        )))
    } else {
        None
    };

    let synthesizer = ThumbnailSynthesizer::new(
        fetcher.clone(),
        compressor,
        Publisher::new(blob_store),
        ThumbnailSettings::from(&config.ingest),
    );

    let queue = create_signal_queue(&config.queue).context("Failed to create signal queue")?;
    info!("Using {} signal queue", queue.name());

    let pipeline = Arc::new(IngestPipeline::new(
        storage.clone(),
        fetcher.clone(),
        synthesizer,
        build_rehoster(&config, &storage),
        queue.clone(),
        PipelineSettings::from(&config.ingest),
    ));

    let blob_root = match config.blob.backend {
        BlobBackend::Filesystem => Some(PathBuf::from(&config.blob.root)),
        BlobBackend::S3 => None,
    };

    let context = StartupContext {
        ingest_service: Arc::new(IngestService::new(pipeline.clone())),
        catalog_service: Arc::new(CatalogService::new(storage.clone())),
        report_service: Arc::new(ReportService::new(
            storage.clone(),
            fetcher,
            config.reports.threshold,
            config.ingest.max_file_size,
        )),
        storage,
        queue,
        pipeline,
        blob_root,
        deadline_secs: config.rehost.processing_deadline_secs,
    };

    info!(
        "Pre-startup processing completed in {} ms",
        start_time.elapsed().as_millis()
    );
    Ok(context)
}
