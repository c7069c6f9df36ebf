//! Request primitives consumed by the router

mod conn_info;
mod request;

pub use conn_info::ConnInfo;
pub use request::Request;
