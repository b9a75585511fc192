//! Worker mode
//!
//! Consumes rehost signals from a shared queue without serving HTTP.

use anyhow::Result;
use tracing::{info, warn};

use crate::config::QueueBackend;
use crate::runtime::lifetime;

pub async fn run_worker() -> Result<()> {
    let startup = lifetime::startup::prepare_startup().await?;

    let config = crate::config::get_config();
    if config.queue.backend == QueueBackend::Memory {
        warn!("Standalone worker on the in-process queue will never receive signals");
    }

    let worker = startup.worker();
    let queue = startup.queue.clone();
    let db_for_shutdown = startup.storage.get_db().clone();

    info!("Rehost worker started");
    tokio::select! {
        _ = worker.run(queue) => {}
        _ = lifetime::shutdown::listen_for_shutdown(&db_for_shutdown) => {
            warn!("Rehost worker stopped");
        }
    }

    Ok(())
}
