pub mod defaults;
pub mod router_config;

pub use defaults::RouterDefaults;
pub use router_config::{ConfigError, RouterConfig};
