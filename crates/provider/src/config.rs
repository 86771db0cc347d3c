//! API client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default CloudAMQP customer API endpoint
pub const DEFAULT_BASE_URL: &str = "https://customer.cloudamqp.com/api";

/// Environment variable holding the account API key
pub const APIKEY_ENV: &str = "CLOUDAMQP_APIKEY";

/// Environment variable overriding the API endpoint
pub const BASEURL_ENV: &str = "CLOUDAMQP_BASEURL";

/// Configuration for the CloudAMQP API client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API endpoint, without a trailing slash
    pub base_url: String,

    /// Account API key, sent as the basic auth password
    #[serde(skip_serializing)]
    pub api_key: String,

    /// Per-request timeout
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// Build a configuration with the given key and default endpoint
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Resolve the provider block against the environment
    ///
    /// A value set in the block always wins. Unset values fall back to
    /// `CLOUDAMQP_APIKEY` and `CLOUDAMQP_BASEURL`, then to the defaults.
    pub fn resolve(api_key: Option<String>, base_url: Option<String>) -> Self {
        let defaults = Self::default();

        Self {
            api_key: api_key
                .or_else(|| env_value(APIKEY_ENV))
                .unwrap_or(defaults.api_key),
            base_url: base_url
                .or_else(|| env_value(BASEURL_ENV))
                .unwrap_or(defaults.base_url),
            ..defaults
        }
    }

    /// Check the configuration is usable and normalise the endpoint
    pub fn validate(mut self) -> Result<Self> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig(format!(
                "an API key is required, set `apikey` or {}",
                APIKEY_ENV
            )));
        }

        let trimmed = self.base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "base URL must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        self.base_url = trimmed.to_string();

        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig(
                "timeout must be at least one second".to_string(),
            ));
        }

        Ok(self)
    }

    /// Request timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
