//! Error types shared by the router, the middleware chain and the server adapter.

mod http_error;

pub use http_error::{HttpError, HttpResult};
