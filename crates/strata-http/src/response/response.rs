//! Response abstraction produced by handlers and middleware
//!
//! Provides fluent response building with status codes, headers, and JSON bodies.
//! The core never transmits a response; the server adapter converts it with
//! [`Response::into_axum_response`].

use crate::errors::{HttpError, HttpResult};
use axum::body::{Body, Bytes};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// HTTP response with status, headers and body
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
}

/// Response body types
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Empty,
    Text(String),
    Bytes(Bytes),
    Json(serde_json::Value),
}

impl Response {
    /// Create response with specific status code
    pub fn with_status(status: StatusCode) -> Self {
        Self {
            status,
            headers: HeaderMap::new(),
            body: ResponseBody::Empty,
        }
    }

    pub fn ok() -> Self {
        Self::with_status(StatusCode::OK)
    }

    pub fn not_found() -> Self {
        Self::with_status(StatusCode::NOT_FOUND)
    }

    pub fn method_not_allowed() -> Self {
        Self::with_status(StatusCode::METHOD_NOT_ALLOWED)
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get header value as a string, if present and valid UTF-8
    pub fn header_str(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    /// Add header to response (consuming)
    pub fn header<K, V>(mut self, key: K, value: V) -> HttpResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.add_header(key, value)?;
        Ok(self)
    }

    /// Add header to response (borrowing - for middleware use)
    pub fn add_header<K, V>(&mut self, key: K, value: V) -> HttpResult<()>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| HttpError::internal(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| HttpError::internal(format!("Invalid header value: {}", e)))?;

        self.headers.insert(name, value);
        Ok(())
    }

    /// Set response body as text
    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.body = ResponseBody::Text(text.into());
        self
    }

    /// Set response body as bytes
    pub fn bytes(mut self, bytes: Bytes) -> Self {
        self.body = ResponseBody::Bytes(bytes);
        self
    }

    /// Set response body as JSON
    pub fn json<T: Serialize>(mut self, data: &T) -> HttpResult<Self> {
        let value = serde_json::to_value(data)
            .map_err(|e| HttpError::internal(format!("JSON serialization failed: {}", e)))?;
        self.body = ResponseBody::Json(value);
        Ok(self)
    }

    /// Set response body as raw JSON value
    pub fn json_value(mut self, value: serde_json::Value) -> Self {
        self.body = ResponseBody::Json(value);
        self
    }

    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Render the body to bytes the way it would be sent on the wire
    pub fn body_bytes(&self) -> HttpResult<Bytes> {
        match &self.body {
            ResponseBody::Empty => Ok(Bytes::new()),
            ResponseBody::Text(text) => Ok(Bytes::from(text.clone())),
            ResponseBody::Bytes(bytes) => Ok(bytes.clone()),
            ResponseBody::Json(value) => serde_json::to_vec(value)
                .map(Bytes::from)
                .map_err(|e| HttpError::internal(format!("JSON serialization failed: {}", e))),
        }
    }

    /// Render the body as UTF-8 text
    pub fn body_text(&self) -> HttpResult<String> {
        let bytes = self.body_bytes()?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| HttpError::internal(format!("Response body is not UTF-8: {}", e)))
    }

    /// Decode the body as JSON into `T`
    pub fn json_body<T: DeserializeOwned>(&self) -> HttpResult<T> {
        match &self.body {
            ResponseBody::Json(value) => Ok(serde_json::from_value(value.clone())?),
            _ => Ok(serde_json::from_slice(&self.body_bytes()?)?),
        }
    }

    /// Convert into an axum response for transmission
    pub fn into_axum_response(mut self) -> HttpResult<axum::response::Response> {
        if !self.headers.contains_key(CONTENT_TYPE) {
            let default = match &self.body {
                ResponseBody::Json(_) => Some("application/json"),
                ResponseBody::Text(_) => Some("text/plain; charset=utf-8"),
                _ => None,
            };
            if let Some(content_type) = default {
                self.headers
                    .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
            }
        }

        let body = Body::from(self.body_bytes()?);
        let mut response = axum::response::Response::new(body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        Ok(response)
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::ok()
    }
}
