//! 路由处理函数

mod blobs;
mod catalog;
mod health;
mod ingest;
mod report;

use actix_web::web;

pub use blobs::{BlobRoot, serve_blob};
pub use catalog::{log_client_error, query_macros, record_usage};
pub use health::{AppStartTime, health_check};
pub use ingest::add_macro;
pub use report::report_macro;

/// 参数既可以来自表单，也可以来自查询串
pub type FormOrQuery<T> = web::Either<web::Form<T>, web::Query<T>>;

pub(crate) fn into_params<T>(input: FormOrQuery<T>) -> T {
    match input {
        web::Either::Left(form) => form.into_inner(),
        web::Either::Right(query) => query.into_inner(),
    }
}
