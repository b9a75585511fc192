//! HTTP 接口
//!
//! 所有响应都是 `{"code": n, "data": ...}`，code 见 [`error_code::ErrorCode`]。

pub mod error_code;
pub mod handlers;
pub mod helpers;
pub mod routes;
pub mod types;

pub use error_code::ErrorCode;
pub use routes::{build_cors, configure_routes};
