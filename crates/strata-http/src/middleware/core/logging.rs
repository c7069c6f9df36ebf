//! # Request Logging Middleware
//!
//! Emits one structured `tracing` event per request with method, path, status
//! and elapsed time.

use crate::middleware::{Handler, Middleware};
use std::time::Instant;

/// Request logging middleware
#[derive(Debug, Clone, Default)]
pub struct RequestLoggingMiddleware {
    log_headers: bool,
}

impl RequestLoggingMiddleware {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also log request header names at debug level
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

impl Middleware for RequestLoggingMiddleware {
    fn wrap(&self, next: Handler) -> Handler {
        let log_headers = self.log_headers;
        Handler::new(move |request, conn, ctx| {
            let next = next.clone();
            async move {
                let start = Instant::now();
                let method = request.method().clone();
                let path = request.path().to_string();

                if log_headers {
                    let names: Vec<&str> = request.headers().keys().map(|k| k.as_str()).collect();
                    tracing::debug!(
                        method = %method,
                        path = %path,
                        headers = ?names,
                        "Request headers"
                    );
                }

                let outcome = next.call(request, conn, ctx).await;
                let elapsed_ms = start.elapsed().as_millis() as u64;

                match &outcome {
                    Ok(response) => tracing::info!(
                        method = %method,
                        path = %path,
                        status = response.status_code().as_u16(),
                        elapsed_ms,
                        "Request completed"
                    ),
                    Err(err) => tracing::warn!(
                        method = %method,
                        path = %path,
                        elapsed_ms,
                        "Request failed: {}",
                        err
                    ),
                }

                outcome
            }
        })
    }

    fn name(&self) -> &'static str {
        "RequestLoggingMiddleware"
    }
}
