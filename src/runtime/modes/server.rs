//! Server mode
//!
//! This module contains the HTTP server startup logic.

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::Result;
use tracing::{info, warn};

use crate::api::handlers::{AppStartTime, BlobRoot};
use crate::api::{build_cors, configure_routes};
use crate::config::QueueBackend;
use crate::runtime::lifetime;

/// Run the HTTP server
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server() -> Result<()> {
    let app_start_time = AppStartTime {
        start_datetime: chrono::Utc::now(),
    };

    let startup = lifetime::startup::prepare_startup().await.map_err(|e| {
        tracing::error!("Server startup failed: {}", e);
        e
    })?;

    let config = crate::config::get_config();

    // 进程内队列只能由本进程消费
    let run_worker = config.server.embedded_worker || config.queue.backend == QueueBackend::Memory;
    let worker_handle = if run_worker {
        let worker = startup.worker();
        let queue = startup.queue.clone();
        info!("Starting embedded rehost worker");
        Some(tokio::spawn(async move { worker.run(queue).await }))
    } else {
        None
    };

    let storage = startup.storage.clone();
    let ingest_service = startup.ingest_service.clone();
    let catalog_service = startup.catalog_service.clone();
    let report_service = startup.report_service.clone();
    let blob_root = BlobRoot(startup.blob_root.clone().unwrap_or_default());

    let cpu_count = config.server.cpu_count.min(32);
    warn!("Using {} CPU cores for the server", cpu_count);

    let db_for_shutdown = storage.get_db().clone();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(build_cors())
            .app_data(web::Data::new(storage.clone()))
            .app_data(web::Data::new(ingest_service.clone()))
            .app_data(web::Data::new(catalog_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(blob_root.clone()))
            .app_data(web::Data::new(app_start_time.clone()))
            .app_data(web::PayloadConfig::new(1024 * 1024))
            .wrap(DefaultHeaders::new().add(("Cache-Control", "no-cache")))
            .configure(configure_routes)
    })
    .keep_alive(std::time::Duration::from_secs(30))
    .workers(cpu_count);

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    warn!("Starting server at http://{}", bind_address);
    let server = server.bind(bind_address)?.disable_signals().run();

    tokio::select! {
        res = server => {
            res?;
        }
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Graceful shutdown completed");
        }
    }

    if let Some(handle) = worker_handle {
        handle.abort();
    }

    Ok(())
}
