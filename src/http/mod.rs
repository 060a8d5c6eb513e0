//! HTTP transport module
//!
//! Provides the request transport with retry, backoff and status classification.
//!
//! # Features
//!
//! - **Automatic Retries**: timeouts, connection failures, 429, 202 and 5xx
//! - **Retry-After**: server-advised delays honoured on 429 and 202
//! - **Backoff Strategies**: Constant, linear and exponential, capped
//! - **Error Classification**: every failure maps onto [`crate::error::ErrorKind`]
//! - **Throttling**: optional token bucket rate limiter using governor

mod backend;
mod classify;
mod rate_limit;
mod request;
mod retry;
mod transport;

pub use backend::{
    HttpBackend, PreparedRequest, RawResponse, ReqwestBackend, RequestBody, SendError, Sleeper,
    TokioSleeper,
};
pub use classify::{classify, is_success, retry_after, ApiFailure};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use request::RequestSpec;
pub use retry::{RetryDecision, RetryPolicy};
pub use transport::Transport;

#[cfg(test)]
pub(crate) mod mock;
