//! Client configuration
//!
//! [`Config`] holds the base URL, credentials, timeout and retry policy. It is
//! only obtainable through [`ConfigBuilder::build`], which validates every
//! field, so a `Config` value is always usable.

use crate::error::{Error, Result};
use crate::http::{RateLimiterConfig, RetryPolicy};
use crate::types::{BackoffType, StringMap};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use std::time::Duration;
use url::Url;

/// Default API root
pub const DEFAULT_BASE_URL: &str = "https://www.courtlistener.com/api/rest/v4/";

/// Environment variable holding the API token
pub const TOKEN_ENV_VAR: &str = "COURTLISTENER_API_TOKEN";

/// Environment variable overriding the API root
pub const BASE_URL_ENV_VAR: &str = "COURTLISTENER_BASE_URL";

/// Validated client configuration
#[derive(Clone)]
pub struct Config {
    api_token: String,
    base_url: Url,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
    default_headers: StringMap,
    rate_limit: Option<RateLimiterConfig>,
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// API root every relative endpoint resolves against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Retry and backoff settings
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// User-Agent sent with every request
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Client-side throttle, if enabled
    pub fn rate_limit(&self) -> Option<&RateLimiterConfig> {
        self.rate_limit.as_ref()
    }

    /// The API token
    pub fn api_token(&self) -> &str {
        &self.api_token
    }

    /// Headers attached to every request: auth token, content type, user agent
    /// and any configured extras.
    pub fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut auth = HeaderValue::from_str(&format!("Token {}", self.api_token))
            .map_err(|e| Error::invalid_value("api_token", e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.user_agent)
                .map_err(|e| Error::invalid_value("user_agent", e.to_string()))?,
        );

        for (key, value) in &self.default_headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| Error::invalid_value(format!("header '{key}'"), e.to_string()))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| Error::invalid_value(format!("header '{key}'"), e.to_string()))?;
            headers.insert(name, value);
        }

        Ok(headers)
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("user_agent", &self.user_agent)
            .field("rate_limit", &self.rate_limit)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Config`]
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    api_token: Option<String>,
    base_url: String,
    timeout: Duration,
    retry: RetryPolicy,
    user_agent: String,
    default_headers: StringMap,
    rate_limit: Option<RateLimiterConfig>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            user_agent: format!("courtlistener-rs/{}", env!("CARGO_PKG_VERSION")),
            default_headers: StringMap::new(),
            rate_limit: None,
        }
    }
}

impl ConfigBuilder {
    /// Builder seeded from `COURTLISTENER_API_TOKEN` and `COURTLISTENER_BASE_URL`
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builder seeded from an arbitrary variable lookup, keyed like [`Self::from_env`]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::default();
        if let Some(token) = lookup(TOKEN_ENV_VAR) {
            builder.api_token = Some(token);
        }
        if let Some(url) = lookup(BASE_URL_ENV_VAR) {
            builder.base_url = url;
        }
        builder
    }

    /// Set the API token
    #[must_use]
    pub fn api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set max retries
    #[must_use]
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.retry.max_retries = retries;
        self
    }

    /// Set the delay before retrying timeouts, connection failures, 5xx and 202
    #[must_use]
    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.retry.retry_delay = delay;
        self
    }

    /// Set the delay before retrying a 429 without `Retry-After`
    #[must_use]
    pub fn rate_limit_delay(mut self, delay: Duration) -> Self {
        self.retry.rate_limit_delay = delay;
        self
    }

    /// Set backoff growth and its cap
    #[must_use]
    pub fn backoff(mut self, backoff: BackoffType, max_backoff_delay: Duration) -> Self {
        self.retry.backoff = backoff;
        self.retry.max_backoff_delay = max_backoff_delay;
        self
    }

    /// Set the ceiling for server-advised `Retry-After` delays
    #[must_use]
    pub fn max_retry_after(mut self, ceiling: Duration) -> Self {
        self.retry.max_retry_after = ceiling;
        self
    }

    /// Replace the whole retry policy
    #[must_use]
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Enable client-side throttling
    #[must_use]
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.rate_limit = Some(config);
        self
    }

    /// Add a default header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<Config> {
        let api_token = self
            .api_token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::missing_field("api_token"))?;

        let base_url = Url::parse(&self.base_url)?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", base_url.scheme()),
            ));
        }

        if self.timeout.is_zero() {
            return Err(Error::invalid_value("timeout", "must be greater than 0"));
        }

        if self.retry.max_backoff_delay < self.retry.retry_delay
            && self.retry.backoff != BackoffType::Constant
        {
            return Err(Error::invalid_value(
                "max_backoff_delay",
                "must not be smaller than retry_delay",
            ));
        }

        let config = Config {
            api_token,
            base_url,
            timeout: self.timeout,
            retry: self.retry,
            user_agent: self.user_agent,
            default_headers: self.default_headers,
            rate_limit: self.rate_limit,
        };

        // Surface bad header values now rather than on the first request
        config.headers()?;

        Ok(config)
    }
}
