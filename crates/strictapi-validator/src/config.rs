//! Validator configuration.
//!
//! Names the specification target and the HTTP fetch timeout. Load from
//! the environment with [`ValidatorConfig::from_env`] or construct
//! explicitly for tests and embedding.

use std::time::Duration;

use url::Url;

use crate::source::DEFAULT_FETCH_TIMEOUT;

/// Variable naming the specification target (URL or file path).
pub const SPEC_ENV: &str = "STRICT_OPENAPI_SPEC";
/// Variable holding the HTTP fetch timeout in whole seconds.
pub const FETCH_TIMEOUT_ENV: &str = "STRICT_OPENAPI_FETCH_TIMEOUT_SECS";

/// Configuration for a [`Validator`](crate::Validator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// HTTP(S) URL or path to a `.json` / `.yml` / `.yaml` file.
    pub spec_target: String,
    pub fetch_timeout: Duration,
}

impl ValidatorConfig {
    pub fn new(spec_target: impl Into<String>) -> Self {
        Self {
            spec_target: spec_target.into(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `STRICT_OPENAPI_SPEC` (required)
    /// - `STRICT_OPENAPI_FETCH_TIMEOUT_SECS` (default: 30)
    ///
    /// URL targets are checked here so that a typo fails at start-up; file
    /// targets are only checked when fetched.
    pub fn from_env() -> Result<Self, ConfigError> {
        let spec_target = std::env::var(SPEC_ENV).map_err(|_| ConfigError::MissingSpec)?;
        if spec_target.starts_with("http") {
            Url::parse(&spec_target)
                .map_err(|e| ConfigError::InvalidUrl(spec_target.clone(), e.to_string()))?;
        }
        Ok(Self {
            spec_target,
            fetch_timeout: Duration::from_secs(
                std::env::var(FETCH_TIMEOUT_ENV)
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT.as_secs()),
            ),
        })
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("STRICT_OPENAPI_SPEC environment variable is required")]
    MissingSpec,
    #[error("invalid URL {0}: {1}")]
    InvalidUrl(String, String),
}
