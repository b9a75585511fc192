use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::trace;

use crate::api::helpers::api_result;
use crate::api::types::AddParams;
use crate::ingest::IngestRequest;
use crate::services::IngestService;

use super::{FormOrQuery, into_params};

/// `POST /add`
pub async fn add_macro(
    params: FormOrQuery<AddParams>,
    service: web::Data<Arc<IngestService>>,
) -> HttpResponse {
    let params = into_params(params);
    trace!("API: add '{}' <- '{}'", params.name, params.url);

    let request = IngestRequest {
        name: params.name,
        url: params.url,
        original_url: params.original_url,
    };

    api_result(service.add_macro(request).await)
}
