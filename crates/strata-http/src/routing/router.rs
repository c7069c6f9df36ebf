//! Route table and dispatch

use super::pattern::RoutePattern;
use crate::config::RouterConfig;
use crate::context::Context;
use crate::errors::HttpResult;
use crate::middleware::{Handler, HandlerFuture, Middleware, MiddlewareChain};
use crate::request::{ConnInfo, Request};
use axum::http::Method;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// A registered route: method, compiled template and its own middleware
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    pattern: RoutePattern,
    middleware: MiddlewareChain,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &RoutePattern {
        &self.pattern
    }

    pub fn middleware(&self) -> &MiddlewareChain {
        &self.middleware
    }
}

/// Route metadata for introspection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteInfo {
    pub method: String,
    pub path: String,
    pub params: Vec<String>,
    pub middleware: Vec<&'static str>,
}

/// Request router.
///
/// Routes are tried in registration order and the first one whose method and
/// template both match handles the request. Global middleware registered with
/// [`Router::use_middleware`] wraps every route, and also the not-found answer.
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
    global: MiddlewareChain,
    config: RouterConfig,
}

impl Router {
    /// Create a new router
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a router with explicit configuration
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            routes: Vec::new(),
            global: MiddlewareChain::new(),
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Register `middleware` for `method` requests matching `template`.
    ///
    /// A malformed template is rejected here and leaves the table unchanged.
    pub fn route(
        &mut self,
        method: Method,
        template: &str,
        middleware: MiddlewareChain,
    ) -> HttpResult<&mut Self> {
        let pattern = match RoutePattern::parse(template) {
            Ok(pattern) => pattern,
            Err(err) => {
                tracing::warn!(method = %method, template, error = %err, "Rejected route");
                return Err(err.into());
            }
        };

        tracing::debug!(
            method = %method,
            template,
            middleware = ?middleware.names(),
            "Registered route"
        );

        self.routes.push(Route {
            method,
            pattern,
            middleware,
        });
        Ok(self)
    }

    /// Add a GET route
    pub fn get<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::GET, template, MiddlewareChain::new().add(middleware))
    }

    /// Add a POST route
    pub fn post<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::POST, template, MiddlewareChain::new().add(middleware))
    }

    /// Add a PUT route
    pub fn put<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::PUT, template, MiddlewareChain::new().add(middleware))
    }

    /// Add a PATCH route
    pub fn patch<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::PATCH, template, MiddlewareChain::new().add(middleware))
    }

    /// Add a DELETE route
    pub fn delete<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::DELETE, template, MiddlewareChain::new().add(middleware))
    }

    pub fn head<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::HEAD, template, MiddlewareChain::new().add(middleware))
    }

    pub fn options<M: Middleware + 'static>(
        &mut self,
        template: &str,
        middleware: M,
    ) -> HttpResult<&mut Self> {
        self.route(Method::OPTIONS, template, MiddlewareChain::new().add(middleware))
    }

    /// Add global middleware, applied to every request whether a route matches or not
    pub fn use_middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        tracing::debug!(middleware = middleware.name(), "Registered global middleware");
        self.global.push(middleware);
        self
    }

    /// Append a whole chain to the global middleware
    pub fn use_chain(&mut self, chain: MiddlewareChain) -> &mut Self {
        tracing::debug!(middleware = ?chain.names(), "Registered global middleware");
        self.global = std::mem::take(&mut self.global).extend(&chain);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Registered routes in dispatch order
    pub fn route_info(&self) -> Vec<RouteInfo> {
        self.routes
            .iter()
            .map(|route| RouteInfo {
                method: route.method.to_string(),
                path: route.pattern.original().to_string(),
                params: route.pattern.param_names().to_vec(),
                middleware: route.middleware.names(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Freeze the current routes and middleware into a dispatch entry point.
    ///
    /// Later registrations on this router are not visible to the returned handler.
    pub fn handler(&self) -> RouterHandler {
        let entries = self
            .routes
            .iter()
            .map(|route| CompiledRoute {
                method: route.method.clone(),
                pattern: route.pattern.clone(),
                handler: self
                    .global
                    .clone()
                    .extend(&route.middleware)
                    .compose(Handler::not_found()),
            })
            .collect();

        RouterHandler {
            table: Arc::new(DispatchTable {
                entries,
                fallback: self.global.compose(Handler::not_found()),
                global: self.global.clone(),
                config: self.config.clone(),
            }),
        }
    }
}

struct CompiledRoute {
    method: Method,
    pattern: RoutePattern,
    handler: Handler,
}

struct DispatchTable {
    entries: Vec<CompiledRoute>,
    fallback: Handler,
    global: MiddlewareChain,
    config: RouterConfig,
}

impl DispatchTable {
    /// Methods of routes whose template matches `path`, in registration order
    fn allowed_methods(&self, path: &str) -> Vec<&Method> {
        let mut methods: Vec<&Method> = Vec::new();
        for entry in &self.entries {
            if entry.pattern.matches(path) && !methods.contains(&&entry.method) {
                methods.push(&entry.method);
            }
        }
        methods
    }

    fn unmatched(&self, path: &str) -> Handler {
        if self.config.method_not_allowed {
            let allowed = self.allowed_methods(path);
            if !allowed.is_empty() {
                let allow = allowed
                    .iter()
                    .map(|method| method.as_str())
                    .collect::<Vec<_>>()
                    .join(", ");
                return self.global.compose(Handler::method_not_allowed(allow));
            }
        }
        self.fallback.clone()
    }
}

/// Immutable snapshot of a [`Router`], safe to share across tasks
#[derive(Clone)]
pub struct RouterHandler {
    table: Arc<DispatchTable>,
}

impl RouterHandler {
    /// Dispatch one request
    pub fn call(&self, request: Request, conn: ConnInfo) -> HandlerFuture {
        let table = &self.table;
        let path = request.path().to_string();

        let matched = table.entries.iter().enumerate().find_map(|(index, entry)| {
            if entry.method != *request.method() {
                return None;
            }
            entry.pattern.match_path(&path).map(|vars| (index, vars))
        });

        match matched {
            Some((index, vars)) => {
                let entry = &table.entries[index];
                if table.config.log_dispatch {
                    tracing::trace!(
                        method = %request.method(),
                        path = %path,
                        route = entry.pattern.original(),
                        "Matched route"
                    );
                }
                entry.handler.call(request, conn, Context::for_route(vars))
            }
            None => {
                if table.config.log_dispatch {
                    tracing::trace!(method = %request.method(), path = %path, "No route matched");
                }
                table.unmatched(&path).call(request, conn, Context::new())
            }
        }
    }

    /// Number of routes in the snapshot
    pub fn len(&self) -> usize {
        self.table.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.entries.is_empty()
    }

    pub fn config(&self) -> &RouterConfig {
        &self.table.config
    }
}

impl fmt::Debug for RouterHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouterHandler")
            .field("routes", &self.table.entries.len())
            .field("global", &self.table.global)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HttpError;
    use crate::middleware::endpoint;
    use crate::response::Response;
    use axum::http::StatusCode;
    use tracing_test::traced_test;

    fn reply(body: &'static str) -> impl Middleware {
        endpoint(move |_request, _conn, _ctx| async move { Ok(Response::ok().text(body)) })
    }

    async fn dispatch(handler: &RouterHandler, method: &str, url: &str) -> Response {
        let request = Request::parse(method, url).unwrap();
        handler.call(request, ConnInfo::detached()).await.unwrap()
    }

    #[tokio::test]
    async fn test_first_registered_route_wins() {
        let mut router = Router::new();
        router
            .get("/users/{id}", reply("by id"))
            .unwrap()
            .get("/users/me", reply("me"))
            .unwrap();

        let handler = router.handler();
        let response = dispatch(&handler, "GET", "http://example.com/users/me").await;
        assert_eq!(response.body_text().unwrap(), "by id");
    }

    #[tokio::test]
    async fn test_method_must_match() {
        let mut router = Router::new();
        router.post("/items", reply("created")).unwrap();

        let handler = router.handler();
        let response = dispatch(&handler, "GET", "http://example.com/items").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

        let response = dispatch(&handler, "POST", "http://example.com/items").await;
        assert_eq!(response.body_text().unwrap(), "created");
    }

    #[tokio::test]
    async fn test_route_vars_reach_handler() {
        let mut router = Router::new();
        router
            .get(
                "/{org}/repos/{repo}",
                endpoint(|_request, _conn, ctx| async move {
                    let vars = ctx.route_vars();
                    Ok(Response::ok().text(format!(
                        "{}:{}",
                        vars.get("org").unwrap_or_default(),
                        vars.get("repo").unwrap_or_default()
                    )))
                }),
            )
            .unwrap();

        let handler = router.handler();
        let response = dispatch(&handler, "GET", "http://example.com/acme/repos/anvil").await;
        assert_eq!(response.body_text().unwrap(), "acme:anvil");
    }

    #[tokio::test]
    async fn test_invalid_template_leaves_table_untouched() {
        let mut router = Router::new();
        router.get("/ok", reply("ok")).unwrap();

        let err = router.get("/{x}/{x}", reply("dup")).unwrap_err();
        assert!(matches!(err, HttpError::InvalidRoute(_)));
        assert_eq!(router.len(), 1);
    }

    #[tokio::test]
    async fn test_handler_is_a_snapshot() {
        let mut router = Router::new();
        router.get("/a", reply("a")).unwrap();
        let before = router.handler();

        router.get("/b", reply("b")).unwrap();
        let after = router.handler();

        let response = dispatch(&before, "GET", "http://example.com/b").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
        let response = dispatch(&after, "GET", "http://example.com/b").await;
        assert_eq!(response.body_text().unwrap(), "b");
    }

    #[tokio::test]
    async fn test_method_not_allowed_when_enabled() {
        let mut router = Router::with_config(RouterConfig::default().with_method_not_allowed(true));
        router
            .get("/things/{id}", reply("get"))
            .unwrap()
            .delete("/things/{id}", reply("delete"))
            .unwrap()
            .get("/things/{id}", reply("again"))
            .unwrap();

        let handler = router.handler();
        let response = dispatch(&handler, "PUT", "http://example.com/things/7").await;
        assert_eq!(response.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.header_str("allow"), Some("GET, DELETE"));

        let response = dispatch(&handler, "PUT", "http://example.com/nothing").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_method_not_allowed_disabled_by_default() {
        let mut router = Router::new();
        router.get("/things", reply("get")).unwrap();

        let response = dispatch(&router.handler(), "PUT", "http://example.com/things").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_route_info() {
        let mut router = Router::new();
        router
            .route(
                Method::PATCH,
                "/posts/{post}",
                MiddlewareChain::new().add(
                    endpoint(|_request, _conn, _ctx| async { Ok(Response::ok()) })
                        .named("patch_post"),
                ),
            )
            .unwrap();

        assert_eq!(
            router.route_info(),
            vec![RouteInfo {
                method: "PATCH".to_string(),
                path: "/posts/{post}".to_string(),
                params: vec!["post".to_string()],
                middleware: vec!["patch_post"],
            }]
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_registration_and_dispatch_are_logged() {
        let mut router = Router::new();
        router.get("/logged", reply("x")).unwrap();
        let _ = router.get("/{bad", reply("x"));

        dispatch(&router.handler(), "GET", "http://example.com/logged").await;

        assert!(logs_contain("Registered route"));
        assert!(logs_contain("Rejected route"));
        assert!(logs_contain("Matched route"));
    }
}
