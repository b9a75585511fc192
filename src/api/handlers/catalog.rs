use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::trace;

use crate::api::error_code::ErrorCode;
use crate::api::helpers::{error_from_macrodex, json_response, ok_response};
use crate::api::types::{ClientErrorParams, QueryParams, UsageParams};
use crate::services::{CatalogService, QueryKind};

use super::{FormOrQuery, into_params};

/// `GET /query?type=search|get|suggestion&text=&page=`
pub async fn query_macros(
    params: web::Query<QueryParams>,
    service: web::Data<Arc<CatalogService>>,
) -> HttpResponse {
    let kind = match QueryKind::parse(&params.kind) {
        Ok(kind) => kind,
        Err(e) => return error_from_macrodex(&e),
    };

    match service.query(kind, &params.text, params.page_number()).await {
        Ok(result) => {
            trace!("API: query {:?} -> {} rows", kind, result.records.len());
            json_response(
                StatusCode::OK,
                ErrorCode::Success,
                Some(result.records),
                result.has_more,
            )
        }
        Err(e) => error_from_macrodex(&e),
    }
}

/// `POST /usage`
pub async fn record_usage(
    params: FormOrQuery<UsageParams>,
    service: web::Data<Arc<CatalogService>>,
) -> HttpResponse {
    let params = into_params(params);

    match service.record_usage(&params.name, &params.trigger).await {
        Ok(()) => ok_response(),
        Err(e) => error_from_macrodex(&e),
    }
}

/// `POST /client_error`
pub async fn log_client_error(
    params: FormOrQuery<ClientErrorParams>,
    service: web::Data<Arc<CatalogService>>,
) -> HttpResponse {
    let params = into_params(params);

    match service
        .log_client_error(&params.version, &params.error_type, &params.stacktrace)
        .await
    {
        Ok(()) => ok_response(),
        Err(e) => error_from_macrodex(&e),
    }
}
