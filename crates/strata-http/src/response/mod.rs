//! Response types produced by the core

mod response;

pub use response::{Response, ResponseBody};
