//! HTTP backend and sleeper seams
//!
//! The transport sends fully prepared requests through an [`HttpBackend`] and
//! waits between attempts through a [`Sleeper`]. The defaults are a single
//! `reqwest` client and `tokio::time::sleep`.

use crate::error::{Error, Result};
use crate::types::StringMap;
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Body attached to a request
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` fields
    Form(StringMap),
    /// JSON document
    Json(Value),
}

/// A request with its URL resolved and headers attached, ready to send
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    /// HTTP method
    pub method: Method,
    /// Resolved URL, without the query string
    pub url: Url,
    /// Query parameters, sorted by key
    pub query: Vec<(String, String)>,
    /// Default and per-request headers, authorization included
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
    /// Per-attempt timeout
    pub timeout: Duration,
}

/// A completed HTTP exchange, status not yet inspected
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Response status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Raw response body
    pub body: Bytes,
}

impl RawResponse {
    /// Build a response from parts
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Build a `200 OK` response with a JSON body
    pub fn json(value: &Value) -> Self {
        Self::new(StatusCode::OK, HeaderMap::new(), value.to_string())
    }
}

/// Failure to obtain any HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendError {
    /// The request exceeded its timeout
    Timeout(String),
    /// The connection could not be established
    Connect(String),
    /// Anything else (protocol errors, body read failures, ...)
    Other(String),
}

impl From<reqwest::Error> for SendError {
    fn from(err: reqwest::Error) -> Self {
        let detail = err.to_string();
        if err.is_timeout() {
            Self::Timeout(detail)
        } else if err.is_connect() {
            Self::Connect(detail)
        } else {
            Self::Other(detail)
        }
    }
}

/// Executes one HTTP exchange. Implementations must not retry.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Send the request once and return whatever the server answered
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, SendError>;
}

/// Waits between retry attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Wait for `duration`
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Backend over a single pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestBackend {
    client: Client,
}

impl ReqwestBackend {
    /// Create a backend with its own connection pool
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| Error::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wrap an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn send(&self, request: &PreparedRequest) -> std::result::Result<RawResponse, SendError> {
        let mut req = self
            .client
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone())
            .timeout(request.timeout);

        if !request.query.is_empty() {
            req = req.query(&request.query);
        }

        req = match &request.body {
            RequestBody::Empty => req,
            RequestBody::Form(fields) => req.form(fields),
            RequestBody::Json(body) => req.json(body),
        };

        let response = req.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}
