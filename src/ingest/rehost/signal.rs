//! 重托管信号队列：进程内 mpsc 或 Redis 列表

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::aio::MultiplexedConnection;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, warn};

use crate::config::{QueueBackend, QueueConfig};
use crate::errors::{MacrodexError, Result};

/// Redis 队列为空时的轮询间隔
const REDIS_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// 一条待处理的重托管信号，带入队时间用于截止判断
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RehostSignal {
    pub name: String,
    pub enqueued_at: DateTime<Utc>,
}

impl RehostSignal {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            enqueued_at: Utc::now(),
        }
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.enqueued_at
    }
}

#[async_trait]
pub trait SignalQueue: Send + Sync {
    async fn emit(&self, signal: &RehostSignal) -> Result<()>;

    /// 等待下一条信号，队列关闭时返回 None
    async fn next(&self) -> Result<Option<RehostSignal>>;

    fn name(&self) -> &'static str;
}

/// 发送失败时重试一次
pub async fn emit_with_retry(queue: &dyn SignalQueue, signal: &RehostSignal) -> Result<()> {
    match queue.emit(signal).await {
        Ok(()) => Ok(()),
        Err(first) => {
            warn!(
                "Emitting rehost signal for '{}' failed, retrying once: {}",
                signal.name, first
            );
            queue.emit(signal).await
        }
    }
}

/// 进程内队列
pub struct MemoryQueue {
    tx: mpsc::Sender<RehostSignal>,
    rx: Mutex<mpsc::Receiver<RehostSignal>>,
}

impl MemoryQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        Self {
            tx,
            rx: Mutex::new(rx),
        }
    }
}

#[async_trait]
impl SignalQueue for MemoryQueue {
    async fn emit(&self, signal: &RehostSignal) -> Result<()> {
        self.tx
            .try_send(signal.clone())
            .map_err(|e| MacrodexError::queue(format!("in-process queue rejected signal: {}", e)))
    }

    async fn next(&self) -> Result<Option<RehostSignal>> {
        Ok(self.rx.lock().await.recv().await)
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

/// Redis 列表队列：LPUSH 入队，RPOP 出队
pub struct RedisQueue {
    client: redis::Client,
    connection: Arc<RwLock<Option<MultiplexedConnection>>>,
    key: String,
}

impl RedisQueue {
    pub fn new(redis_url: &str, key: &str) -> Result<Self> {
        let client = redis::Client::open(redis_url)?;
        debug!("RedisQueue created for key '{}'", key);
        Ok(Self {
            client,
            connection: Arc::new(RwLock::new(None)),
            key: key.to_string(),
        })
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        {
            let guard = self.connection.read().await;
            if let Some(ref conn) = *guard {
                return Ok(conn.clone());
            }
        }

        let mut guard = self.connection.write().await;
        if let Some(ref conn) = *guard {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        debug!("Redis queue connection established");
        Ok(conn)
    }

    async fn reset_connection(&self) {
        *self.connection.write().await = None;
    }
}

#[async_trait]
impl SignalQueue for RedisQueue {
    async fn emit(&self, signal: &RehostSignal) -> Result<()> {
        let payload = serde_json::to_string(signal)?;
        let mut conn = self.get_connection().await?;

        let result: redis::RedisResult<i64> = redis::cmd("LPUSH")
            .arg(&self.key)
            .arg(payload)
            .query_async(&mut conn)
            .await;

        if let Err(e) = result {
            self.reset_connection().await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn next(&self) -> Result<Option<RehostSignal>> {
        loop {
            let mut conn = self.get_connection().await?;
            let result: redis::RedisResult<Option<String>> = redis::cmd("RPOP")
                .arg(&self.key)
                .query_async(&mut conn)
                .await;

            match result {
                Ok(Some(payload)) => match serde_json::from_str(&payload) {
                    Ok(signal) => return Ok(Some(signal)),
                    Err(e) => warn!("Dropping malformed rehost signal {:?}: {}", payload, e),
                },
                Ok(None) => tokio::time::sleep(REDIS_POLL_INTERVAL).await,
                Err(e) => {
                    self.reset_connection().await;
                    return Err(e.into());
                }
            }
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

/// 根据配置创建信号队列
pub fn create_signal_queue(config: &QueueConfig) -> Result<Arc<dyn SignalQueue>> {
    let queue: Arc<dyn SignalQueue> = match config.backend {
        QueueBackend::Memory => Arc::new(MemoryQueue::new(config.capacity)),
        QueueBackend::Redis => Arc::new(RedisQueue::new(&config.redis_url, &config.key)?),
    };
    Ok(queue)
}
