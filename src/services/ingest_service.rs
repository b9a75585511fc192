//! 入库服务：HTTP 层与流水线之间的薄封装

use std::sync::Arc;

use tracing::{info, warn};

use crate::errors::{ErrorKind, MacrodexError};
use crate::ingest::{IngestPipeline, IngestRequest};
use crate::storage::MacroEntry;

pub struct IngestService {
    pipeline: Arc<IngestPipeline>,
}

impl IngestService {
    pub fn new(pipeline: Arc<IngestPipeline>) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &Arc<IngestPipeline> {
        &self.pipeline
    }

    /// 新增一个宏
    pub async fn add_macro(&self, request: IngestRequest) -> Result<MacroEntry, MacrodexError> {
        match self.pipeline.ingest(&request).await {
            Ok(entry) => {
                info!(
                    "IngestService: added '{}' -> '{}' ({:?})",
                    entry.name, entry.url, entry.state
                );
                Ok(entry)
            }
            Err(e) => {
                if e.kind() == ErrorKind::Client {
                    info!("IngestService: rejected '{}': {}", request.name, e);
                } else {
                    warn!("IngestService: failed to add '{}': {}", request.name, e);
                }
                Err(e)
            }
        }
    }
}
