//! Mode routing
//!
//! - `serve`: HTTP server, optionally with the in-process rehost worker
//! - `worker`: standalone queue consumer

pub mod server;
pub mod worker;

pub use server::run_server;
pub use worker::run_worker;
