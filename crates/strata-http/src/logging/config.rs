//! Subscriber setup for binaries embedding the router
//!
//! The router only emits `tracing` events (registration at `debug`, dispatch at
//! `trace`, built-in middleware at `info`/`warn`/`error`). Installing a
//! subscriber is left to the application; [`init_logging`] covers the usual case.

use crate::config::ConfigError;
use crate::errors::{HttpError, HttpResult};
use std::env;
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::{fmt::Layer, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the installed subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Single-line human readable output
    #[default]
    Compact,
    /// Multi-line output with source locations
    Pretty,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Ok(LogFormat::Compact),
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(ConfigError::InvalidValue {
                field: "log_format".to_string(),
                value: other.to_string(),
                expected: "compact, pretty or json".to_string(),
            }),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Subscriber settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directives, e.g. `info` or `strata_http=trace,hyper=warn`
    pub filter: String,
    pub format: LogFormat,
    /// Service name attached to the startup event
    pub service: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            format: LogFormat::Compact,
            service: None,
        }
    }
}

impl LoggingConfig {
    pub fn new<S: Into<String>>(filter: S) -> Self {
        Self {
            filter: filter.into(),
            ..Self::default()
        }
    }

    /// Read `STRATA_LOG` and `STRATA_LOG_FORMAT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(filter) = lookup("STRATA_LOG") {
            config.filter = filter;
        }
        if let Some(format) = lookup("STRATA_LOG_FORMAT") {
            config.format = format.parse()?;
        }
        Ok(config)
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_service<S: Into<String>>(mut self, service: S) -> Self {
        self.service = Some(service.into());
        self
    }

    /// Build the filter; `RUST_LOG` wins over the configured directives
    pub fn env_filter(&self) -> HttpResult<EnvFilter> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.filter))
            .map_err(|e| {
                HttpError::Config(ConfigError::InvalidValue {
                    field: "log_filter".to_string(),
                    value: self.filter.clone(),
                    expected: format!("valid filter directives ({})", e),
                })
            })
    }
}

/// Install the global subscriber described by `config`.
///
/// Fails when the filter does not parse or a global subscriber already exists.
pub fn init_logging(config: &LoggingConfig) -> HttpResult<()> {
    let filter = config.env_filter()?;
    let registry = tracing_subscriber::registry().with(filter);

    let installed = match config.format {
        LogFormat::Compact => registry.with(Layer::new().compact()).try_init(),
        LogFormat::Pretty => registry.with(Layer::new().pretty()).try_init(),
        LogFormat::Json => registry.with(Layer::new().json()).try_init(),
    };
    installed.map_err(|e| HttpError::startup(format!("Failed to install subscriber: {}", e)))?;

    tracing::info!(
        service = config.service.as_deref().unwrap_or("strata-http"),
        format = %config.format,
        filter = %config.filter,
        "Logging initialized"
    );
    Ok(())
}
