//! Service layer for business logic
//!
//! Shared between the HTTP handlers and the background worker.

mod catalog_service;
mod ingest_service;
mod report_service;

pub use catalog_service::*;
pub use ingest_service::*;
pub use report_service::*;
