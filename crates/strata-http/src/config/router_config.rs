//! Router configuration
//!
//! Values come from [`RouterConfig::default`] or from `STRATA_*` environment
//! variables via [`RouterConfig::from_env`].

use super::defaults::RouterDefaults;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {field}: '{value}' (expected {expected})")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Router behaviour switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Answer 405 instead of 404 when the path matches a route of another method
    pub method_not_allowed: bool,
    /// Largest request body the server adapter buffers, in bytes
    pub max_body_size: usize,
    /// Log dispatch decisions
    pub log_dispatch: bool,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            method_not_allowed: RouterDefaults::METHOD_NOT_ALLOWED,
            max_body_size: RouterDefaults::MAX_BODY_SIZE,
            log_dispatch: RouterDefaults::LOG_DISPATCH,
        }
    }
}

impl RouterConfig {
    /// Load configuration from `STRATA_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let method_not_allowed = parse_or_default(
            &lookup,
            "STRATA_METHOD_NOT_ALLOWED",
            "method_not_allowed",
            RouterDefaults::METHOD_NOT_ALLOWED,
            "true or false",
        )?;

        let max_body_size = parse_or_default(
            &lookup,
            "STRATA_MAX_BODY_SIZE",
            "max_body_size",
            RouterDefaults::MAX_BODY_SIZE,
            "valid number of bytes",
        )?;

        let log_dispatch = parse_or_default(
            &lookup,
            "STRATA_LOG_DISPATCH",
            "log_dispatch",
            RouterDefaults::LOG_DISPATCH,
            "true or false",
        )?;

        let config = RouterConfig {
            method_not_allowed,
            max_body_size,
            log_dispatch,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_body_size == 0 {
            return Err(ConfigError::ValidationFailed(
                "Maximum body size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_method_not_allowed(mut self, enable: bool) -> Self {
        self.method_not_allowed = enable;
        self
    }

    pub fn with_max_body_size(mut self, bytes: usize) -> Self {
        self.max_body_size = bytes;
        self
    }
}

fn parse_or_default<F, T>(
    lookup: &F,
    key: &str,
    field: &str,
    default: T,
    expected: &str,
) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidValue {
            field: field.to_string(),
            value: raw.clone(),
            expected: expected.to_string(),
        }),
    }
}
