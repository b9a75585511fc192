use sea_orm::DatabaseConnection;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{error, info};

use crate::system::wait_for_shutdown_signal;

/// 关闭超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待关闭信号，然后关闭数据库连接池
pub async fn listen_for_shutdown(db: &DatabaseConnection) {
    wait_for_shutdown_signal().await;

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), db.clone().close()).await {
        Ok(Ok(())) => info!("Database connections closed"),
        Ok(Err(e)) => error!("Failed to close database connections: {}", e),
        Err(_) => error!(
            "Closing database connections timed out after {} seconds",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
