//! 路由配置

use actix_cors::Cors;
use actix_web::web;

use super::handlers::{
    add_macro, health_check, log_client_error, query_macros, record_usage, report_macro,
    serve_blob,
};

/// CORS 对任意来源开放
pub fn build_cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600)
}

/// 注册全部路由
///
/// - POST /add
/// - GET /query
/// - POST /usage
/// - POST /report
/// - POST /client_error
/// - GET /blobs/{key}
/// - GET /health
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/add", web::post().to(add_macro))
        .route("/query", web::get().to(query_macros))
        .route("/usage", web::post().to(record_usage))
        .route("/report", web::post().to(report_macro))
        .route("/client_error", web::post().to(log_client_error))
        .route("/blobs/{key}", web::get().to(serve_blob))
        .route("/health", web::get().to(health_check))
        .route("/health", web::head().to(health_check));
}
