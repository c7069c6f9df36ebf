//! Routing: path templates, extracted route variables and the router itself

pub mod params;
pub mod pattern;
pub mod router;

pub use params::RouteVars;
pub use pattern::{PathSegment, RoutePattern, RoutePatternError};
pub use router::{Route, RouteInfo, Router, RouterHandler};
