//! Serving a router over a real loopback socket

use serde_json::json;
use std::net::SocketAddr;
use strata_http::server::{bind, serve_with_shutdown};
use strata_http::{
    endpoint, route_vars, HttpError, Response, Router, RouterConfig, RouterHandler, StatusCode,
};
use tokio::sync::oneshot;

struct TestServer {
    addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: tokio::task::JoinHandle<Result<(), HttpError>>,
}

impl TestServer {
    async fn start(handler: RouterHandler) -> Self {
        let listener = bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(serve_with_shutdown(listener, handler, async move {
            let _ = rx.await;
        }));

        Self {
            addr,
            shutdown: Some(tx),
            task,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await.unwrap().unwrap();
    }
}

fn test_router() -> Router {
    let mut router = Router::with_config(RouterConfig::default().with_max_body_size(16));
    router
        .get(
            "/hello/{name}",
            endpoint(|request, conn, ctx| async move {
                let name = route_vars(&ctx).get("name").unwrap_or_default().to_string();
                Response::ok().json(&json!({
                    "name": name,
                    "url": request.url(),
                    "has_peer": conn.remote_addr.is_some(),
                }))
            }),
        )
        .unwrap()
        .post(
            "/echo",
            endpoint(|request, _conn, _ctx| async move {
                Ok(Response::ok().bytes(request.body().clone()))
            }),
        )
        .unwrap()
        .get(
            "/fail",
            endpoint(|_request, _conn, _ctx| async { Err(HttpError::internal("exploded")) }),
        )
        .unwrap();
    router
}

#[tokio::test]
async fn test_serves_matched_route() {
    let server = TestServer::start(test_router().handler()).await;

    let response = reqwest::get(server.url("/hello/ada")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], "ada");
    assert_eq!(body["url"], server.url("/hello/ada"));
    assert_eq!(body["has_peer"], true);

    server.stop().await;
}

#[tokio::test]
async fn test_unmatched_request_is_not_found() {
    let server = TestServer::start(test_router().handler()).await;

    let response = reqwest::get(server.url("/nowhere")).await.unwrap();
    assert_eq!(response.status().as_u16(), StatusCode::NOT_FOUND.as_u16());
    assert_eq!(response.text().await.unwrap(), "Not Found");

    server.stop().await;
}

#[tokio::test]
async fn test_body_is_forwarded_and_limited() {
    let server = TestServer::start(test_router().handler()).await;
    let client = reqwest::Client::new();

    let response = client
        .post(server.url("/echo"))
        .body("small")
        .send()
        .await
        .unwrap();
    assert_eq!(response.text().await.unwrap(), "small");

    let response = client
        .post(server.url("/echo"))
        .body("this body is far beyond sixteen bytes")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 413);

    server.stop().await;
}

#[tokio::test]
async fn test_uncaught_error_becomes_json_response() {
    let server = TestServer::start(test_router().handler()).await;

    let response = reqwest::get(server.url("/fail")).await.unwrap();
    assert_eq!(response.status().as_u16(), 500);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

    server.stop().await;
}
