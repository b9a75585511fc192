//! macrodex - catalog service for shareable image and animation macros
//!
//! Macros are named images or animations. Each one is backed by a servable
//! artifact and a size-bounded thumbnail.
//!
//! # Architecture
//! - `ingest`: validation, probing, dedup, thumbnail synthesis, rehosting
//! - `storage`: catalog persistence (sea-orm) and counters
//! - `blob`: public object store (filesystem / S3)
//! - `net`: blocking HTTP client wrapped for async use
//! - `services`: business logic shared by the HTTP API and the worker
//! - `api`: HTTP routes
//! - `config`: configuration management
//! - `runtime`: application lifecycle and execution modes
//! - `system`: logging and signal handling

pub mod api;
pub mod blob;
pub mod cli;
pub mod config;
pub mod errors;
pub mod ingest;
pub mod net;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
