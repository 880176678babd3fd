//! Process configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use bankmark_observability::{LogFormat, UnknownLogFormat};

pub const ARTIFACT_VAR: &str = "BANKMARK_ARTIFACT";
pub const BIND_VAR: &str = "BANKMARK_BIND";
pub const LOG_FORMAT_VAR: &str = "BANKMARK_LOG_FORMAT";

pub const DEFAULT_ARTIFACT: &str = "models/pipeline.json";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{BIND_VAR}={value:?} is not a socket address: {source}")]
    Bind {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("{LOG_FORMAT_VAR}: {0}")]
    LogFormat(#[from] UnknownLogFormat),
}

/// Settings for the HTTP server binary.
#[derive(Debug, Clone, PartialEq)]
pub struct ServeConfig {
    /// Pipeline artifact loaded once at start-up.
    pub artifact: PathBuf,
    pub bind: SocketAddr,
    pub log_format: LogFormat,
}

impl ServeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let artifact = lookup(ARTIFACT_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARTIFACT));

        let bind_value = lookup(BIND_VAR).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind = bind_value.parse().map_err(|source| ConfigError::Bind {
            value: bind_value.clone(),
            source,
        })?;

        let log_format = match lookup(LOG_FORMAT_VAR) {
            Some(v) => v.parse()?,
            None => LogFormat::default(),
        };

        Ok(Self {
            artifact,
            bind,
            log_format,
        })
    }
}
