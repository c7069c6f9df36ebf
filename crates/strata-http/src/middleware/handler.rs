//! Handler type shared by every layer of the onion

use crate::context::Context;
use crate::errors::HttpResult;
use crate::foundation::BoxFuture;
use crate::request::{ConnInfo, Request};
use crate::response::Response;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

/// Future returned by a [`Handler`]
pub type HandlerFuture = BoxFuture<'static, HttpResult<Response>>;

type HandlerFn = dyn Fn(Request, ConnInfo, Context) -> HandlerFuture + Send + Sync;

/// A cloneable async function `(request, connection info, context) -> response`.
///
/// Middleware receive the next handler in the chain and return a handler for
/// their own layer; a composed chain is itself just a `Handler`.
#[derive(Clone)]
pub struct Handler {
    inner: Arc<HandlerFn>,
}

impl Handler {
    /// Wrap an async function as a handler
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Request, ConnInfo, Context) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HttpResult<Response>> + Send + 'static,
    {
        let inner: Arc<HandlerFn> =
            Arc::new(move |request: Request, conn: ConnInfo, ctx: Context| {
                Box::pin(f(request, conn, ctx)) as HandlerFuture
            });
        Self { inner }
    }

    /// Run the handler
    pub fn call(&self, request: Request, conn: ConnInfo, ctx: Context) -> HandlerFuture {
        (self.inner)(request, conn, ctx)
    }

    /// Terminal handler answering `404 Not Found`
    pub fn not_found() -> Self {
        Self::new(|_request, _conn, _ctx| async { Ok(Response::not_found().text("Not Found")) })
    }

    /// Terminal handler answering `405 Method Not Allowed` with an `Allow` header
    pub fn method_not_allowed(allow: String) -> Self {
        Self::new(move |_request, _conn, _ctx| {
            let allow = allow.clone();
            async move {
                Response::method_not_allowed()
                    .text("Method Not Allowed")
                    .header("allow", allow)
            }
        })
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").finish_non_exhaustive()
    }
}
