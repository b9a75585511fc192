//! System-level modules
//!
//! - Logging initialization
//! - Shutdown signal handling

pub mod logging;
pub mod shutdown;

pub use logging::init_logging;
pub use shutdown::wait_for_shutdown_signal;
