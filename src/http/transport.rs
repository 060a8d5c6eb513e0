//! Request transport with retry
//!
//! Executes one logical request per call:
//! - Resolves the endpoint against the base URL without dropping base path segments
//! - Attaches the configured headers
//! - Retries transient failures (timeouts, connection failures, 429, 202, 5xx)
//! - Classifies everything else and surfaces it as a typed error

use super::backend::{
    HttpBackend, PreparedRequest, RawResponse, ReqwestBackend, RequestBody, SendError, Sleeper,
    TokioSleeper,
};
use super::classify::{classify, ApiFailure};
use super::rate_limit::RateLimiter;
use super::request::RequestSpec;
use super::retry::RetryDecision;
use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::types::StringMap;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

/// Why an attempt produced no usable response
enum AttemptFailure {
    /// Maps onto the error taxonomy
    Classified(ApiFailure),
    /// Transport error that is neither a timeout nor a connect failure
    Unclassified(String),
}

/// Executes requests against the configured API root.
///
/// Cloning is cheap and clones share the connection pool and throttle.
#[derive(Clone)]
pub struct Transport {
    config: Arc<Config>,
    headers: HeaderMap,
    backend: Arc<dyn HttpBackend>,
    sleeper: Arc<dyn Sleeper>,
    rate_limiter: Option<RateLimiter>,
}

impl Transport {
    /// Create a transport backed by `reqwest` and the tokio timer
    pub fn new(config: Config) -> Result<Self> {
        let backend = ReqwestBackend::new(config.user_agent())?;
        Self::with_backend(config, Arc::new(backend), Arc::new(TokioSleeper))
    }

    /// Create a transport over a custom backend and sleeper
    pub fn with_backend(
        config: Config,
        backend: Arc<dyn HttpBackend>,
        sleeper: Arc<dyn Sleeper>,
    ) -> Result<Self> {
        let headers = config.headers()?;
        let rate_limiter = config.rate_limit().map(RateLimiter::new);

        Ok(Self {
            config: Arc::new(config),
            headers,
            backend,
            sleeper,
            rate_limiter,
        })
    }

    /// The configuration this transport was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Make a GET request
    pub async fn get(&self, endpoint: &str, params: StringMap) -> Result<Value> {
        self.execute(RequestSpec::get(endpoint).params(params)).await
    }

    /// Make a POST request with a JSON body
    pub async fn post_json(&self, endpoint: &str, body: Value) -> Result<Value> {
        self.execute(RequestSpec::post(endpoint).json(body)).await
    }

    /// Make a POST request with a form body
    pub async fn post_form(&self, endpoint: &str, data: StringMap) -> Result<Value> {
        self.execute(RequestSpec::post(endpoint).form(data)).await
    }

    /// Execute one logical request, retrying transient failures.
    ///
    /// Returns the parsed JSON body of the first successful response, or the
    /// classified error of the last attempt.
    pub async fn execute(&self, spec: RequestSpec) -> Result<Value> {
        let request = self.prepare(&spec)?;
        let policy = self.config.retry();
        let max_retries = spec.max_retries.unwrap_or(policy.max_retries);
        let mut attempt: u32 = 0;

        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            debug!(
                "Sending {} {} (attempt {}/{})",
                spec.method,
                request.url,
                attempt + 1,
                max_retries + 1
            );

            let failure = match self.backend.send(&request).await {
                Ok(response) => match classify(response.status, &response.headers, &response.body)
                {
                    None => {
                        debug!("Request succeeded: {} {}", spec.method, request.url);
                        return decode_body(&response);
                    }
                    Some(failure) => AttemptFailure::Classified(failure),
                },
                Err(SendError::Timeout(detail)) => AttemptFailure::Classified(ApiFailure::new(
                    ErrorKind::Timeout,
                    with_detail("Request timed out", &detail),
                )),
                Err(SendError::Connect(detail)) => AttemptFailure::Classified(ApiFailure::new(
                    ErrorKind::ConnectionFailure,
                    with_detail("Failed to connect to API", &detail),
                )),
                Err(SendError::Other(detail)) => AttemptFailure::Unclassified(detail),
            };

            let (decision, reason) = match &failure {
                AttemptFailure::Classified(failure) => (
                    policy.decide(&failure.kind, attempt, max_retries),
                    failure.message.as_str(),
                ),
                AttemptFailure::Unclassified(detail) if attempt < max_retries => (
                    RetryDecision::Retry(policy.calculate_backoff(attempt)),
                    detail.as_str(),
                ),
                AttemptFailure::Unclassified(_) => (RetryDecision::Fail, ""),
            };

            match decision {
                RetryDecision::Retry(delay) => {
                    warn!(
                        "{}, attempt {}/{}, retrying in {:?}",
                        reason,
                        attempt + 1,
                        max_retries + 1,
                        delay
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
                RetryDecision::Fail => {
                    return Err(match failure {
                        AttemptFailure::Classified(failure) => failure.into(),
                        AttemptFailure::Unclassified(detail) => Error::request(detail),
                    });
                }
            }
        }
    }

    /// Resolve an endpoint to a full URL.
    ///
    /// `/`-prefixed endpoints are appended to the whole base URL, since a plain
    /// relative join would replace the base path.
    pub fn resolve_url(&self, endpoint: &str) -> Result<Url> {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return Ok(Url::parse(endpoint)?);
        }

        let base = self.config.base_url();
        if endpoint.starts_with('/') {
            let joined = format!("{}{}", base.as_str().trim_end_matches('/'), endpoint);
            return Ok(Url::parse(&joined)?);
        }

        Ok(base.join(endpoint)?)
    }

    fn prepare(&self, spec: &RequestSpec) -> Result<PreparedRequest> {
        let url = self.resolve_url(&spec.endpoint)?;

        let mut query: Vec<(String, String)> = spec
            .params
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        query.sort();

        let mut headers = self.headers.clone();
        if matches!(spec.body, RequestBody::Form(_)) {
            // Let the form encoder set its own content type
            headers.remove(CONTENT_TYPE);
        }

        Ok(PreparedRequest {
            method: reqwest::Method::from(spec.method),
            url,
            query,
            headers,
            body: spec.body.clone(),
            timeout: spec.timeout.unwrap_or(self.config.timeout()),
        })
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Parse a successful response body. An empty body is `null`.
fn decode_body(response: &RawResponse) -> Result<Value> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_slice(&response.body)?)
}

fn with_detail(message: &str, detail: &str) -> String {
    let detail = detail.trim();
    if detail.is_empty() {
        message.to_string()
    } else {
        format!("{message}: {detail}")
    }
}
