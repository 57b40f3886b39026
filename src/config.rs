//! Client configuration.
//!
//! A [`StoreConfig`] names the region, endpoint and profile the client is bound
//! to, plus the [`TransportSettings`] applied to every request it makes.
//!
//! It can be built in code, loaded from a JSON file:
//! ```json
//! {
//!   "region": "us-east-1",
//!   "endpoint": "https://secretsmanager.us-east-1.amazonaws.com",
//!   "profile": "default",
//!   "transport": { "connect_timeout_secs": 5, "request_timeout_secs": 30, "max_retries": 2 }
//! }
//! ```
//! or read from the `SECRETS_KVS_*` environment variables.

use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const REGION_ENV: &str = "SECRETS_KVS_REGION";
pub const ENDPOINT_ENV: &str = "SECRETS_KVS_ENDPOINT";
pub const PROFILE_ENV: &str = "SECRETS_KVS_PROFILE";

/// Largest accepted `max_retries`.
pub const MAX_RETRIES_LIMIT: u32 = 10;

/// Timeouts and retry count for the HTTP transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TransportSettings {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Upper bound for each individual attempt.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_connect_timeout() -> u64 {
    5
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    2
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

impl TransportSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Total attempts per operation, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Validated configuration for a [`SecretStoreClient`](crate::store::SecretStoreClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    region: String,
    endpoint: Url,
    profile: String,
    transport: TransportSettings,
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Loads the config from a JSON file at `path`.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        StoreConfigBuilder::from_file(path)?.build()
    }

    /// Parses the config from a JSON document.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        StoreConfigBuilder::from_json(content, "<inline>")?.build()
    }

    /// Reads the config from `SECRETS_KVS_REGION`, `SECRETS_KVS_ENDPOINT` and
    /// `SECRETS_KVS_PROFILE`.
    pub fn from_env() -> Result<Self, ConfigError> {
        StoreConfigBuilder::from_env().build()
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn profile(&self) -> &str {
        &self.profile
    }

    pub fn transport(&self) -> &TransportSettings {
        &self.transport
    }
}

/// Builder for [`StoreConfig`]. Nothing is checked until [`build`](Self::build).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoreConfigBuilder {
    region: Option<String>,
    #[serde(alias = "url")]
    endpoint: Option<String>,
    profile: Option<String>,
    #[serde(default)]
    transport: TransportSettings,
}

impl StoreConfigBuilder {
    /// Starts a builder from whichever `SECRETS_KVS_*` variables are set.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Starts a builder from `lookup`, called with each `SECRETS_KVS_*` name.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            region: lookup(REGION_ENV),
            endpoint: lookup(ENDPOINT_ENV),
            profile: lookup(PROFILE_ENV),
            transport: TransportSettings::default(),
        }
    }

    /// Reads a builder from a JSON file at `path` without validating it.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_json(&content, path)
    }

    fn from_json(content: &str, path: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    /// Replaces each field with the one from `overrides` where that is set.
    /// Transport settings always come from `self`.
    pub fn overlay(self, overrides: StoreConfigBuilder) -> Self {
        Self {
            region: overrides.region.or(self.region),
            endpoint: overrides.endpoint.or(self.endpoint),
            profile: overrides.profile.or(self.profile),
            transport: self.transport,
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn transport(mut self, transport: TransportSettings) -> Self {
        self.transport = transport;
        self
    }

    /// Validates the fields and produces the config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] for an absent or empty field (checked in
    /// the order region, endpoint, profile), [`ConfigError::InvalidEndpoint`]
    /// if the endpoint is not an absolute URL and [`ConfigError::TooManyRetries`]
    /// if `max_retries` exceeds [`MAX_RETRIES_LIMIT`].
    pub fn build(self) -> Result<StoreConfig, ConfigError> {
        let region = required(self.region, "region")?;
        let endpoint = required(self.endpoint, "endpoint")?;
        let profile = required(self.profile, "profile")?;

        if self.transport.max_retries > MAX_RETRIES_LIMIT {
            return Err(ConfigError::TooManyRetries {
                max_retries: self.transport.max_retries,
                limit: MAX_RETRIES_LIMIT,
            });
        }

        let endpoint = Url::parse(&endpoint)
            .map_err(|source| ConfigError::InvalidEndpoint { endpoint, source })?;

        Ok(StoreConfig {
            region,
            endpoint,
            profile,
            transport: self.transport,
        })
    }
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(field)),
    }
}
