//! Description of one logical HTTP call

use super::backend::RequestBody;
use crate::types::{Method, StringMap};
use serde_json::Value;
use std::time::Duration;

/// One logical request. The transport may send it several times.
#[derive(Debug, Clone, Default)]
pub struct RequestSpec {
    /// HTTP method
    pub method: Method,
    /// Endpoint, absolute URL, `/`-prefixed path or path relative to the base URL
    pub endpoint: String,
    /// Query parameters
    pub params: StringMap,
    /// Request body
    pub body: RequestBody,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
    /// Override max retries for this request
    pub max_retries: Option<u32>,
}

impl RequestSpec {
    /// Create a request for an endpoint
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            ..Self::default()
        }
    }

    /// Create a GET request
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::GET, endpoint)
    }

    /// Create a POST request
    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(Method::POST, endpoint)
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a set of query parameters
    #[must_use]
    pub fn params(mut self, params: StringMap) -> Self {
        self.params.extend(params);
        self
    }

    /// Set form body
    #[must_use]
    pub fn form(mut self, data: StringMap) -> Self {
        self.body = RequestBody::Form(data);
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set max retries
    #[must_use]
    pub fn retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }
}
