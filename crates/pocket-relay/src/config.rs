//! Relay client configuration.
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `POCKET_ENDPOINT` | Base URL of the serving node | `http://localhost:8081` |
//! | `POCKET_AAT_VERSION` | Version stamped into AATs | `0.0.1` |
//! | `POCKET_RELAY_METHOD` | HTTP method carried in relay payloads | `POST` |
//! | `POCKET_RELAY_PATH` | HTTP path carried in relay payloads | empty |
//! | `POCKET_REQUEST_TIMEOUT_SECS` | Per-request transport timeout | `30` |
//!
//! Method and path are hashed into every request, so client and verifier
//! must agree on them. Key material is never read from configuration.

use std::time::Duration;

use pocket_relay_core::payload::{DEFAULT_METHOD, DEFAULT_PATH};
use pocket_relay_core::AAT_VERSION;

use crate::error::{RelayError, Result};

pub const ENDPOINT_ENV: &str = "POCKET_ENDPOINT";
pub const AAT_VERSION_ENV: &str = "POCKET_AAT_VERSION";
pub const RELAY_METHOD_ENV: &str = "POCKET_RELAY_METHOD";
pub const RELAY_PATH_ENV: &str = "POCKET_RELAY_PATH";
pub const REQUEST_TIMEOUT_ENV: &str = "POCKET_REQUEST_TIMEOUT_SECS";

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8081";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the relay client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Base URL of the serving node, without the `/v1` suffix.
    pub endpoint: String,
    /// Version stamped into every AAT.
    pub aat_version: String,
    /// Method carried in every relay payload.
    pub request_method: String,
    /// Path carried in every relay payload.
    pub request_path: String,
    /// Transport timeout per request.
    pub request_timeout: Duration,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            aat_version: AAT_VERSION.to_string(),
            request_method: DEFAULT_METHOD.to_string(),
            request_path: DEFAULT_PATH.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl RelayConfig {
    /// Load from the process environment, falling back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let request_timeout = match lookup(REQUEST_TIMEOUT_ENV) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    RelayError::Config(format!(
                        "{REQUEST_TIMEOUT_ENV} must be whole seconds, got {raw:?}"
                    ))
                })?;
                Duration::from_secs(secs)
            }
            None => defaults.request_timeout,
        };

        let config = Self {
            endpoint: lookup(ENDPOINT_ENV).unwrap_or(defaults.endpoint),
            aat_version: lookup(AAT_VERSION_ENV).unwrap_or(defaults.aat_version),
            request_method: lookup(RELAY_METHOD_ENV).unwrap_or(defaults.request_method),
            request_path: lookup(RELAY_PATH_ENV).unwrap_or(defaults.request_path),
            request_timeout,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(RelayError::Config(format!(
                "endpoint must be an http(s) URL, got {:?}",
                self.endpoint
            )));
        }
        if self.aat_version.is_empty() {
            return Err(RelayError::Config("AAT version must not be empty".into()));
        }
        if self.request_method.is_empty() {
            return Err(RelayError::Config("relay method must not be empty".into()));
        }
        Ok(())
    }
}
