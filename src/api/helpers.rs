//! API 帮助函数

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

use crate::errors::{ErrorKind, MacrodexError};

use super::error_code::ErrorCode;
use super::types::ApiResponse;

/// 业务错误仍返回 200，由 code 区分；基础设施故障返回 500
pub fn status_for(err: &MacrodexError) -> StatusCode {
    match err.kind() {
        ErrorKind::Infra => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::OK,
    }
}

/// 构建 JSON 响应
pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    data: Option<T>,
    has_more: Option<bool>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code,
            data,
            has_more,
        })
}

/// 构建成功响应
pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, Some(data), None)
}

/// 只有 code 的成功响应
pub fn ok_response() -> HttpResponse {
    json_response::<()>(StatusCode::OK, ErrorCode::Success, None, None)
}

/// 从 MacrodexError 构建错误响应
pub fn error_from_macrodex(err: &MacrodexError) -> HttpResponse {
    json_response::<()>(status_for(err), ErrorCode::from(err), None, None)
}

/// 统一 Result → HttpResponse 转换
pub fn api_result<T: Serialize>(result: Result<T, MacrodexError>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(e) => error_from_macrodex(&e),
    }
}
