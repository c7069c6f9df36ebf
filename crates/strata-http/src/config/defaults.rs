//! Default configuration values

pub struct RouterDefaults;

impl RouterDefaults {
    pub const METHOD_NOT_ALLOWED: bool = false;
    pub const MAX_BODY_SIZE: usize = 2 * 1024 * 1024;
    pub const LOG_DISPATCH: bool = true;
}
