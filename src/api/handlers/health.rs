use actix_web::{HttpResponse, web};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, trace};

use crate::api::types::HealthResponse;
use crate::storage::SeaOrmStorage;

// 应用启动时间结构体
#[derive(Clone, Debug)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// `GET /health`：存活 + 数据库 ping
pub async fn health_check(
    storage: web::Data<Arc<SeaOrmStorage>>,
    app_start_time: web::Data<AppStartTime>,
) -> HttpResponse {
    trace!("Received health check request");

    let uptime_secs = (chrono::Utc::now() - app_start_time.start_datetime).num_seconds();
    let storage_type = storage.get_backend_config().storage_type;

    let checked = tokio::time::timeout(Duration::from_secs(5), async {
        storage.ping().await?;
        storage.count().await
    })
    .await;

    let (status, macros, error) = match checked {
        Ok(Ok(count)) => ("healthy", Some(count), None),
        Ok(Err(e)) => {
            error!("Storage health check failed: {}", e);
            ("unhealthy", None, Some(format!("database error: {}", e)))
        }
        Err(_) => {
            error!("Storage health check timeout");
            ("unhealthy", None, Some("timeout".to_string()))
        }
    };

    let body = HealthResponse {
        status: status.to_string(),
        storage_type,
        macros,
        uptime_secs,
        error,
    };

    if status == "healthy" {
        HttpResponse::Ok().json(body)
    } else {
        HttpResponse::ServiceUnavailable().json(body)
    }
}
