//! # strata-http
//!
//! Request router built around onion-style middleware.
//!
//! - Path templates with `{name}` variable segments, compiled at registration
//! - First-registered matching route wins
//! - Immutable per-request [`Context`] carrying route variables and middleware values
//! - Global middleware wrapping every route, and the not-found answer too
//! - A thin adapter for serving a router with `axum::serve`
//!
//! ```no_run
//! use strata_http::{endpoint, ConnInfo, Request, Response, Router};
//!
//! # async fn run() -> strata_http::HttpResult<()> {
//! let mut router = Router::new();
//! router.get(
//!     "/hello/{name}",
//!     endpoint(|_req, _conn, ctx| async move {
//!         let name = ctx.route_vars().get("name").unwrap_or("world").to_string();
//!         Ok(Response::ok().text(format!("Hello, {}!", name)))
//!     }),
//! )?;
//!
//! let handler = router.handler();
//! let response = handler
//!     .call(Request::get("http://localhost/hello/ada")?, ConnInfo::detached())
//!     .await?;
//! assert_eq!(response.body_text()?, "Hello, ada!");
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod config;
pub mod context;
pub mod errors;
pub mod foundation;
pub mod logging;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;
pub mod server;

pub use config::{ConfigError, RouterConfig};
pub use context::{route_vars, Context};
pub use errors::{HttpError, HttpResult};
pub use foundation::BoxFuture;
pub use logging::{init_logging, LogFormat, LoggingConfig};

// Re-export middleware types
pub use middleware::{
    compose, endpoint, from_fn, ErrorHandlerMiddleware, Handler, HandlerFuture, Middleware,
    MiddlewareChain, RequestLoggingMiddleware, TimingMiddleware,
};

pub use request::{ConnInfo, Request};
pub use response::{Response, ResponseBody};

// Re-export routing types
pub use routing::{RouteInfo, RoutePattern, RoutePatternError, RouteVars, Router, RouterHandler};

pub use axum::http::{Method, StatusCode};
