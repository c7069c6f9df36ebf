//! Request abstraction consumed by the router
//!
//! Wraps the `http` request primitives (method, absolute URI, headers, body).
//! The router only reads the method and the URI path; everything else is
//! carried through for middleware.

use crate::errors::{HttpError, HttpResult};
use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method, Uri};

/// Incoming request as seen by the middleware chain
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Build a request from a method name and URL string.
    ///
    /// Method names are normalised to upper case, so `"get"` and `"GET"` are
    /// the same request.
    pub fn parse(method: &str, url: &str) -> HttpResult<Self> {
        let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|e| HttpError::bad_request(format!("Invalid method '{}': {}", method, e)))?;
        let uri = url
            .parse::<Uri>()
            .map_err(|e| HttpError::bad_request(format!("Invalid URL '{}': {}", url, e)))?;
        Ok(Self::new(method, uri))
    }

    /// Shorthand for a `GET` request to `url`
    pub fn get(url: &str) -> HttpResult<Self> {
        Self::parse("GET", url)
    }

    /// Add header to request (consuming)
    pub fn with_header<K, V>(mut self, key: K, value: V) -> HttpResult<Self>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let name = HeaderName::from_bytes(key.as_ref().as_bytes())
            .map_err(|e| HttpError::bad_request(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::from_str(value.as_ref())
            .map_err(|e| HttpError::bad_request(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body<B: Into<Bytes>>(mut self, body: B) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Full request URL as given (absolute when the request carried one)
    pub fn url(&self) -> String {
        self.uri.to_string()
    }

    /// Path component used for route matching
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get header value as a string, if present and valid UTF-8
    pub fn header_str(&self, key: &str) -> Option<&str> {
        self.headers.get(key).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }
}
