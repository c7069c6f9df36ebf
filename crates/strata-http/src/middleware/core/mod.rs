//! Built-in middleware

pub mod error_handler;
pub mod logging;
pub mod timing;

pub use error_handler::{ErrorHandlerConfig, ErrorHandlerMiddleware};
pub use logging::RequestLoggingMiddleware;
pub use timing::{RequestStartTime, TimingMiddleware};
