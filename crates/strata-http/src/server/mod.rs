//! Server adapter - wires a [`RouterHandler`] into `axum::serve`
//!
//! The router core never touches sockets. This module converts incoming axum
//! requests into [`Request`] values, forwards connection addresses as
//! [`ConnInfo`], and turns any `HttpError` that escapes the middleware chain
//! into a JSON error response.

use crate::errors::{HttpError, HttpResult};
use crate::request::{ConnInfo, Request};
use crate::routing::RouterHandler;
use axum::extract::{ConnectInfo, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::IntoResponse;
use http_body_util::LengthLimitError;
use std::error::Error as StdError;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

#[derive(Clone)]
struct ServerState {
    handler: RouterHandler,
    local_addr: Option<SocketAddr>,
}

/// Bind a TCP listener, reporting failures as startup errors
pub async fn bind(addr: SocketAddr) -> HttpResult<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| HttpError::startup(format!("Failed to bind to {}: {}", addr, e)))
}

/// Build an axum router that sends every request through `handler`
pub fn app(handler: RouterHandler) -> axum::Router {
    build_app(handler, None)
}

fn build_app(handler: RouterHandler, local_addr: Option<SocketAddr>) -> axum::Router {
    axum::Router::new()
        .fallback(dispatch)
        .with_state(ServerState {
            handler,
            local_addr,
        })
}

/// Serve `handler` on `listener` until the process receives Ctrl+C or SIGTERM
pub async fn serve(listener: TcpListener, handler: RouterHandler) -> HttpResult<()> {
    serve_with_shutdown(listener, handler, shutdown_signal()).await
}

/// Serve `handler` on `listener` until `signal` resolves
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    handler: RouterHandler,
    signal: F,
) -> HttpResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr()?;
    info!(address = %local_addr, routes = handler.len(), "Server listening");

    let app = build_app(handler, Some(local_addr));
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| HttpError::internal(format!("Server error: {}", e)))?;

    info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, shutting down gracefully");
        },
        _ = terminate => {
            warn!("Received terminate signal, shutting down gracefully");
        },
    }
}

async fn dispatch(
    State(state): State<ServerState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: axum::extract::Request,
) -> axum::response::Response {
    let conn = ConnInfo {
        local_addr: state.local_addr,
        remote_addr: connect_info.map(|ConnectInfo(addr)| addr),
    };

    let limit = state.handler.config().max_body_size;
    let result = match from_axum_request(request, limit, state.local_addr).await {
        Ok(request) => state.handler.call(request, conn).await,
        Err(err) => Err(err),
    };

    let response = result.unwrap_or_else(|err| {
        if err.status_code().is_server_error() {
            error!(error = %err, "Request failed");
        }
        err.into_response()
    });

    match response.into_axum_response() {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "Failed to encode response");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}

async fn from_axum_request(
    request: axum::extract::Request,
    limit: usize,
    local_addr: Option<SocketAddr>,
) -> HttpResult<Request> {
    let (parts, body) = request.into_parts();

    let declared = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if let Some(size) = declared {
        if size > limit {
            return Err(HttpError::PayloadTooLarge { size, limit });
        }
    }

    let body = axum::body::to_bytes(body, limit).await.map_err(|e| {
        if exceeded_limit(&e) {
            HttpError::PayloadTooLarge {
                size: declared.unwrap_or(limit.saturating_add(1)),
                limit,
            }
        } else {
            HttpError::bad_request(format!("Failed to read request body: {}", e))
        }
    })?;

    let uri = absolute_uri(&parts.uri, &parts.headers, local_addr)?;

    Ok(Request::new(parts.method, uri)
        .with_headers(parts.headers)
        .with_body(body))
}

/// Whether a body read failed because it outgrew the configured limit
fn exceeded_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(current) = source {
        if current.is::<LengthLimitError>() {
            return true;
        }
        source = current.source();
    }
    false
}

/// Origin-form request targets are rebuilt into absolute URLs using `Host`
fn absolute_uri(
    uri: &Uri,
    headers: &axum::http::HeaderMap,
    local_addr: Option<SocketAddr>,
) -> HttpResult<Uri> {
    if uri.scheme().is_some() && uri.authority().is_some() {
        return Ok(uri.clone());
    }

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| local_addr.map(|addr| addr.to_string()))
        .unwrap_or_else(|| "localhost".to_string());
    let path_and_query = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    format!("http://{}{}", host, path_and_query)
        .parse::<Uri>()
        .map_err(|e| HttpError::bad_request(format!("Invalid request target: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;

    #[test]
    fn test_absolute_uri_from_host() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "example.com:8080".parse().unwrap());
        let uri: Uri = "/a/b?c=d".parse().unwrap();

        let absolute = absolute_uri(&uri, &headers, None).unwrap();
        assert_eq!(absolute.to_string(), "http://example.com:8080/a/b?c=d");
    }

    #[test]
    fn test_absolute_uri_falls_back_to_local_addr() {
        let uri: Uri = "/".parse().unwrap();
        let local: SocketAddr = "127.0.0.1:3000".parse().unwrap();

        let absolute = absolute_uri(&uri, &HeaderMap::new(), Some(local)).unwrap();
        assert_eq!(absolute.to_string(), "http://127.0.0.1:3000/");
    }

    #[test]
    fn test_absolute_form_kept() {
        let uri: Uri = "http://proxy.test/x".parse().unwrap();
        let absolute = absolute_uri(&uri, &HeaderMap::new(), None).unwrap();
        assert_eq!(absolute, uri);
    }

    #[tokio::test]
    async fn test_streamed_body_over_limit_rejected() {
        let chunks = futures_util::stream::iter(vec![
            Ok::<_, std::io::Error>("0123"),
            Ok("4567"),
            Ok("89"),
        ]);
        let request = axum::extract::Request::builder()
            .method("POST")
            .uri("/upload")
            .body(axum::body::Body::from_stream(chunks))
            .unwrap();

        let err = from_axum_request(request, 4, None).await.unwrap_err();
        assert!(matches!(err, HttpError::PayloadTooLarge { limit: 4, .. }));
        assert_eq!(err.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_declared_body_over_limit_rejected() {
        let request = axum::extract::Request::builder()
            .method("POST")
            .uri("/upload")
            .header(header::CONTENT_LENGTH, "10")
            .body(axum::body::Body::from("0123456789"))
            .unwrap();

        let err = from_axum_request(request, 4, None).await.unwrap_err();
        assert!(matches!(err, HttpError::PayloadTooLarge { size: 10, limit: 4 }));
    }
}
