//! # Middleware
//!
//! A middleware is a handler transformer: it receives the next handler in the
//! chain and returns the handler for its own layer. Composing `[m1, m2, m3]`
//! around a terminal `h` yields `m1(m2(m3(h)))`, so `m1` runs first and decides
//! whether to call into the rest of the chain or answer on its own.
//!
//! Any `Fn(Handler) -> Handler` closure is a middleware. [`from_fn`] covers the
//! common `handle(request, next)` shape and [`endpoint`] builds a terminal layer
//! that never calls `next`.

pub mod core;
mod handler;
mod pipeline;

pub use self::core::{
    ErrorHandlerConfig, ErrorHandlerMiddleware, RequestLoggingMiddleware, TimingMiddleware,
};
pub use handler::{Handler, HandlerFuture};
pub use pipeline::{compose, MiddlewareChain};

use crate::context::Context;
use crate::errors::HttpResult;
use crate::request::{ConnInfo, Request};
use crate::response::Response;
use std::future::Future;
use std::sync::Arc;

/// One layer of the onion
pub trait Middleware: Send + Sync {
    /// Build this layer's handler around `next`
    fn wrap(&self, next: Handler) -> Handler;

    /// Optional middleware name for debugging
    fn name(&self) -> &'static str {
        "Middleware"
    }
}

impl<F> Middleware for F
where
    F: Fn(Handler) -> Handler + Send + Sync,
{
    fn wrap(&self, next: Handler) -> Handler {
        self(next)
    }
}

/// Middleware built from an async `handle(request, conn, ctx, next)` function
pub struct FnMiddleware<F> {
    f: Arc<F>,
    name: &'static str,
}

impl<F> FnMiddleware<F> {
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl<F, Fut> Middleware for FnMiddleware<F>
where
    F: Fn(Request, ConnInfo, Context, Handler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResult<Response>> + Send + 'static,
{
    fn wrap(&self, next: Handler) -> Handler {
        let f = Arc::clone(&self.f);
        Handler::new(move |request, conn, ctx| f(request, conn, ctx, next.clone()))
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Middleware from a function that receives the rest of the chain as `next`
pub fn from_fn<F, Fut>(f: F) -> FnMiddleware<F>
where
    F: Fn(Request, ConnInfo, Context, Handler) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResult<Response>> + Send + 'static,
{
    FnMiddleware {
        f: Arc::new(f),
        name: "FnMiddleware",
    }
}

/// Terminal middleware: answers every request itself and ignores `next`
pub struct Endpoint {
    handler: Handler,
    name: &'static str,
}

impl Endpoint {
    pub fn named(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }
}

impl Middleware for Endpoint {
    fn wrap(&self, _next: Handler) -> Handler {
        self.handler.clone()
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

/// Terminal middleware from an async `(request, conn, ctx)` function
pub fn endpoint<F, Fut>(f: F) -> Endpoint
where
    F: Fn(Request, ConnInfo, Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HttpResult<Response>> + Send + 'static,
{
    Endpoint {
        handler: Handler::new(f),
        name: "Endpoint",
    }
}
