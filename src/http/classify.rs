//! Status classification
//!
//! Maps a completed HTTP response onto the [`ErrorKind`] taxonomy. Pure: no
//! I/O and no retry logic, the transport owns those decisions.

use crate::error::{Error, ErrorKind};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;

/// A classified non-success response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// Taxonomy entry for the response
    pub kind: ErrorKind,
    /// Human-readable message
    pub message: String,
}

impl ApiFailure {
    /// Create a failure
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl From<ApiFailure> for Error {
    fn from(failure: ApiFailure) -> Self {
        Error::api(failure.kind, failure.message)
    }
}

/// Whether a status is treated as a successful response.
///
/// 202 is excluded: the server has only queued the work.
pub fn is_success(status: StatusCode) -> bool {
    status.is_success() && status != StatusCode::ACCEPTED
}

/// Classify a response. Returns `None` for successful responses.
pub fn classify(status: StatusCode, headers: &HeaderMap, body: &[u8]) -> Option<ApiFailure> {
    if is_success(status) {
        return None;
    }

    let failure = match status.as_u16() {
        202 => ApiFailure::new(
            ErrorKind::Accepted {
                retry_after: retry_after(headers),
            },
            "Request accepted and being processed asynchronously",
        ),
        401 => ApiFailure::new(ErrorKind::Authentication, "Invalid API token"),
        404 => ApiFailure::new(ErrorKind::NotFound, "Resource not found"),
        429 => ApiFailure::new(
            ErrorKind::RateLimit {
                retry_after: retry_after(headers),
            },
            "Rate limit exceeded",
        ),
        code @ 500.. => {
            ApiFailure::new(ErrorKind::ServerError { status: code }, format!("Server error: {code}"))
        }
        code => ApiFailure::new(ErrorKind::ClientError { status: code }, detail_message(code, body)),
    };

    Some(failure)
}

/// Extract the `Retry-After` header as whole seconds
pub fn retry_after(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
}

/// Use the body's `detail` field when the body is JSON, else `HTTP {status}`
fn detail_message(status: u16, body: &[u8]) -> String {
    let detail = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(Value::String(text)) => text,
        Some(Value::Null) | None => format!("HTTP {status}"),
        Some(other) => other.to_string(),
    }
}

#[cfg(test)]
mod classify_tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use test_case::test_case;

    fn status(code: u16) -> StatusCode {
        StatusCode::from_u16(code).unwrap()
    }

    #[test_case(401, ErrorKind::Authentication ; "unauthorized")]
    #[test_case(404, ErrorKind::NotFound ; "not found")]
    #[test_case(429, ErrorKind::RateLimit { retry_after: None } ; "rate limited")]
    #[test_case(202, ErrorKind::Accepted { retry_after: None } ; "accepted")]
    #[test_case(500, ErrorKind::ServerError { status: 500 } ; "internal server error")]
    #[test_case(503, ErrorKind::ServerError { status: 503 } ; "unavailable")]
    #[test_case(599, ErrorKind::ServerError { status: 599 } ; "unassigned 5xx")]
    #[test_case(600, ErrorKind::ServerError { status: 600 } ; "nonstandard 600")]
    #[test_case(999, ErrorKind::ServerError { status: 999 } ; "nonstandard 999")]
    #[test_case(400, ErrorKind::ClientError { status: 400 } ; "bad request")]
    #[test_case(403, ErrorKind::ClientError { status: 403 } ; "forbidden")]
    #[test_case(418, ErrorKind::ClientError { status: 418 } ; "teapot")]
    fn test_status_table(code: u16, expected: ErrorKind) {
        let failure = classify(status(code), &HeaderMap::new(), b"").unwrap();
        assert_eq!(failure.kind, expected);
    }

    #[test_case(200 ; "ok")]
    #[test_case(201 ; "created")]
    #[test_case(204 ; "no content")]
    fn test_success_is_not_classified(code: u16) {
        assert!(classify(status(code), &HeaderMap::new(), b"").is_none());
    }

    #[test]
    fn test_retry_after_header() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, HeaderValue::from_static("5"));

        let failure = classify(status(429), &headers, b"").unwrap();
        assert_eq!(failure.kind, ErrorKind::RateLimit { retry_after: Some(5) });

        let failure = classify(status(202), &headers, b"").unwrap();
        assert_eq!(failure.kind, ErrorKind::Accepted { retry_after: Some(5) });
    }

    #[test]
    fn test_unparseable_retry_after_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(
            RETRY_AFTER,
            HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"),
        );
        assert_eq!(retry_after(&headers), None);
    }

    #[test]
    fn test_client_error_uses_detail() {
        let failure = classify(status(400), &HeaderMap::new(), br#"{"detail": "Bad filter"}"#)
            .unwrap();
        assert_eq!(failure.message, "Bad filter");
    }

    #[test]
    fn test_client_error_falls_back_without_json() {
        let failure = classify(status(400), &HeaderMap::new(), b"<html>oops</html>").unwrap();
        assert_eq!(failure.message, "HTTP 400");

        let failure = classify(status(422), &HeaderMap::new(), br#"{"error": "x"}"#).unwrap();
        assert_eq!(failure.message, "HTTP 422");
    }

    #[test]
    fn test_fixed_messages() {
        let headers = HeaderMap::new();
        assert_eq!(
            classify(status(401), &headers, b"").unwrap().message,
            "Invalid API token"
        );
        assert_eq!(
            classify(status(502), &headers, b"").unwrap().message,
            "Server error: 502"
        );
    }
}
