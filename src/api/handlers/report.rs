use actix_web::{HttpResponse, web};
use std::sync::Arc;
use tracing::debug;

use crate::api::helpers::{error_from_macrodex, ok_response};
use crate::api::types::ReportParams;
use crate::services::ReportService;

use super::{FormOrQuery, into_params};

/// `POST /report`
pub async fn report_macro(
    params: FormOrQuery<ReportParams>,
    service: web::Data<Arc<ReportService>>,
) -> HttpResponse {
    let params = into_params(params);

    match service.report(&params.name).await {
        Ok(outcome) => {
            debug!("API: report '{}' -> {:?}", params.name, outcome);
            ok_response()
        }
        Err(e) => error_from_macrodex(&e),
    }
}
