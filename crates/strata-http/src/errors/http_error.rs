//! HTTP error type
//!
//! Every fallible public operation returns [`HttpResult`]. Registration failures
//! surface as [`HttpError::InvalidRoute`]; failures raised by middleware travel
//! up the chain untouched until an error-handling layer (or the server adapter)
//! turns them into a response.

use crate::config::ConfigError;
use crate::response::Response;
use crate::routing::RoutePatternError;
use axum::http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Errors produced while building or running a router
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Invalid route template: {0}")]
    InvalidRoute(#[from] RoutePatternError),

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Method {method} not allowed for {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error("Invalid request: {message}")]
    BadRequest { message: String },

    #[error("Request too large: {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Internal server error: {message}")]
    Internal { message: String },

    #[error("Server startup failed: {message}")]
    Startup { message: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl HttpError {
    /// Create a not found error
    pub fn not_found<T: Into<String>>(resource: T) -> Self {
        HttpError::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a method not allowed error
    pub fn method_not_allowed<M: Into<String>, P: Into<String>>(method: M, path: P) -> Self {
        HttpError::MethodNotAllowed {
            method: method.into(),
            path: path.into(),
        }
    }

    /// Create a bad request error
    pub fn bad_request<T: Into<String>>(message: T) -> Self {
        HttpError::BadRequest {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<T: Into<String>>(message: T) -> Self {
        HttpError::Internal {
            message: message.into(),
        }
    }

    /// Create a startup error
    pub fn startup<T: Into<String>>(message: T) -> Self {
        HttpError::Startup {
            message: message.into(),
        }
    }

    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            HttpError::InvalidRoute(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
            HttpError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            HttpError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            HttpError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Startup { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            HttpError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get error code for consistent API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            HttpError::InvalidRoute(_) => "INVALID_ROUTE",
            HttpError::NotFound { .. } => "RESOURCE_NOT_FOUND",
            HttpError::MethodNotAllowed { .. } => "METHOD_NOT_ALLOWED",
            HttpError::BadRequest { .. } => "BAD_REQUEST",
            HttpError::PayloadTooLarge { .. } => "REQUEST_TOO_LARGE",
            HttpError::Internal { .. } => "INTERNAL_ERROR",
            HttpError::Startup { .. } => "SERVER_STARTUP_FAILED",
            HttpError::Config(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Render this error as a JSON error response
    pub fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });

        Response::with_status(self.status_code()).json_value(body)
    }
}

impl From<std::io::Error> for HttpError {
    fn from(err: std::io::Error) -> Self {
        HttpError::Internal {
            message: format!("IO error: {}", err),
        }
    }
}

impl From<serde_json::Error> for HttpError {
    fn from(err: serde_json::Error) -> Self {
        HttpError::Internal {
            message: format!("JSON serialization error: {}", err),
        }
    }
}
