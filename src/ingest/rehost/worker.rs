//! 异步重托管消费者

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn};

use super::signal::{RehostSignal, SignalQueue};
use crate::errors::Result;
use crate::ingest::pipeline::IngestPipeline;
use crate::storage::{EntryState, SeaOrmStorage};

/// 队列读取失败后的等待时间
const QUEUE_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// 单条信号的处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Finalized,
    /// 超过处理期限，pending 行及其计数已清除
    Abandoned,
    /// 行已不存在
    Missing,
    /// 已经是 ready，无需处理
    AlreadyReady,
    /// 合成失败，pending 行及其计数已清除
    Failed(String),
}

pub struct RehostWorker {
    storage: Arc<SeaOrmStorage>,
    pipeline: Arc<IngestPipeline>,
    deadline: chrono::Duration,
}

impl RehostWorker {
    pub fn new(pipeline: Arc<IngestPipeline>, deadline_secs: u64) -> Self {
        Self {
            storage: pipeline.storage().clone(),
            pipeline,
            deadline: chrono::Duration::seconds(deadline_secs as i64),
        }
    }

    /// 期限只在开始处理时检查一次
    pub async fn handle(&self, signal: &RehostSignal, now: DateTime<Utc>) -> Result<WorkerOutcome> {
        let age = signal.age(now);
        if age > self.deadline {
            warn!(
                "Rehost of '{}' is {}s old (deadline {}s), abandoning",
                signal.name,
                age.num_seconds(),
                self.deadline.num_seconds()
            );
            self.storage.purge(&signal.name).await?;
            return Ok(WorkerOutcome::Abandoned);
        }

        let entry = match self.storage.get(&signal.name).await? {
            Some(entry) => entry,
            None => {
                warn!("Pending macro '{}' not found", signal.name);
                return Ok(WorkerOutcome::Missing);
            }
        };

        if entry.state == EntryState::Ready {
            return Ok(WorkerOutcome::AlreadyReady);
        }

        match self.pipeline.complete_pending(entry).await {
            Ok(_) => Ok(WorkerOutcome::Finalized),
            Err(e) => {
                error!("Processing pending macro '{}' failed: {}", signal.name, e);
                self.storage.purge(&signal.name).await?;
                Ok(WorkerOutcome::Failed(e.to_string()))
            }
        }
    }

    /// 持续消费信号，直到队列关闭
    pub async fn run(&self, queue: Arc<dyn SignalQueue>) {
        info!("Rehost worker consuming from {} queue", queue.name());

        loop {
            match queue.next().await {
                Ok(Some(signal)) => match self.handle(&signal, Utc::now()).await {
                    Ok(outcome) => info!("Rehost signal '{}': {:?}", signal.name, outcome),
                    Err(e) => error!("Rehost signal '{}' failed: {}", signal.name, e),
                },
                Ok(None) => {
                    info!("Signal queue closed, rehost worker exiting");
                    break;
                }
                Err(e) => {
                    error!("Reading signal queue failed: {}", e);
                    tokio::time::sleep(QUEUE_ERROR_BACKOFF).await;
                }
            }
        }
    }
}
