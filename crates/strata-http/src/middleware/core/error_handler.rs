//! Error handling middleware
//!
//! The router never catches failures raised by middleware. Registering this
//! layer first (via `Router::use_middleware`) turns an `Err` from any inner
//! layer into the JSON error response for that error, and optionally does the
//! same for a panicking inner future.

use crate::errors::HttpError;
use crate::middleware::{Handler, Middleware};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;

/// Error handling middleware configuration
#[derive(Debug, Clone)]
pub struct ErrorHandlerConfig {
    /// Convert panics in inner layers into 500 responses
    pub catch_panics: bool,

    /// Whether to include panic details in error responses (development only)
    pub include_panic_details: bool,

    /// Whether to log errors
    pub log_errors: bool,
}

impl Default for ErrorHandlerConfig {
    fn default() -> Self {
        Self {
            catch_panics: false,
            include_panic_details: cfg!(debug_assertions),
            log_errors: true,
        }
    }
}

/// Error handling middleware
#[derive(Debug, Clone, Default)]
pub struct ErrorHandlerMiddleware {
    config: ErrorHandlerConfig,
}

impl ErrorHandlerMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ErrorHandlerConfig) -> Self {
        Self { config }
    }

    /// Also recover from panics raised while running inner layers
    pub fn catch_panics(mut self, enable: bool) -> Self {
        self.config.catch_panics = enable;
        self
    }

    /// Enable panic details in responses (use only in development)
    pub fn with_panic_details(mut self, include: bool) -> Self {
        self.config.include_panic_details = include;
        self
    }

    pub fn with_logging(mut self, enable: bool) -> Self {
        self.config.log_errors = enable;
        self
    }
}

impl Middleware for ErrorHandlerMiddleware {
    fn wrap(&self, next: Handler) -> Handler {
        let config = self.config.clone();
        Handler::new(move |request, conn, ctx| {
            let next = next.clone();
            let config = config.clone();
            async move {
                let method = request.method().clone();
                let path = request.path().to_string();

                let outcome = if config.catch_panics {
                    // Inner layers may panic while building their future, not only while polling it
                    let inner = async move { next.call(request, conn, ctx).await };
                    match AssertUnwindSafe(inner).catch_unwind().await {
                        Ok(outcome) => outcome,
                        Err(panic) => Err(HttpError::internal(panic_message(
                            panic.as_ref(),
                            config.include_panic_details,
                        ))),
                    }
                } else {
                    next.call(request, conn, ctx).await
                };

                match outcome {
                    Ok(response) => Ok(response),
                    Err(err) => {
                        if config.log_errors {
                            tracing::error!(
                                method = %method,
                                path = %path,
                                code = err.error_code(),
                                "Request failed: {}",
                                err
                            );
                        }
                        Ok(err.into_response())
                    }
                }
            }
        })
    }

    fn name(&self) -> &'static str {
        "ErrorHandlerMiddleware"
    }
}

fn panic_message(panic: &(dyn Any + Send), include_details: bool) -> String {
    if !include_details {
        return "Handler panicked".to_string();
    }

    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("Handler panicked: {}", detail)
}
