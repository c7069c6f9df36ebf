//! # Timing Middleware
//!
//! Records when a request entered the chain and reports the elapsed time in an
//! `x-response-time` header.

use crate::errors::HttpError;
use crate::middleware::{Handler, Middleware};
use std::time::{Duration, Instant};

/// Context value holding the request start time
#[derive(Debug, Clone, Copy)]
pub struct RequestStartTime(Instant);

impl RequestStartTime {
    pub fn now() -> Self {
        Self(Instant::now())
    }

    pub fn elapsed(&self) -> Duration {
        self.0.elapsed()
    }
}

/// Request timing middleware
#[derive(Debug, Clone)]
pub struct TimingMiddleware {
    add_header: bool,
    slow_request_threshold_ms: u64,
}

impl TimingMiddleware {
    /// Context key under which the [`RequestStartTime`] is stored
    pub const START_KEY: &'static str = "strata.request_start";

    pub fn new() -> Self {
        Self {
            add_header: true,
            slow_request_threshold_ms: 1000,
        }
    }

    /// Disable adding timing header to responses
    pub fn without_header(mut self) -> Self {
        self.add_header = false;
        self
    }

    /// Set slow request warning threshold in milliseconds
    pub fn with_slow_threshold(mut self, threshold_ms: u64) -> Self {
        self.slow_request_threshold_ms = threshold_ms;
        self
    }
}

impl Default for TimingMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl Middleware for TimingMiddleware {
    fn wrap(&self, next: Handler) -> Handler {
        let add_header = self.add_header;
        let slow_threshold = self.slow_request_threshold_ms;
        Handler::new(move |request, conn, ctx| {
            let next = next.clone();
            async move {
                let start = RequestStartTime::now();
                let path = request.path().to_string();
                let ctx = ctx.with_value(Self::START_KEY, start);

                let mut response = next.call(request, conn, ctx).await?;

                let elapsed_ms = start.elapsed().as_millis() as u64;
                if elapsed_ms > slow_threshold {
                    tracing::warn!(path = %path, elapsed_ms, "Slow request");
                }
                if add_header {
                    response.add_header("x-response-time", format!("{}ms", elapsed_ms))?;
                }
                Ok::<_, HttpError>(response)
            }
        })
    }

    fn name(&self) -> &'static str {
        "TimingMiddleware"
    }
}
