//! Error types for the CourtListener client
//!
//! This module defines the closed failure taxonomy produced by the status
//! classifier ([`ErrorKind`]) and the crate-wide [`Error`] that every public
//! API returns.

use std::fmt;
use thiserror::Error;

/// Classified failure of a single logical request.
///
/// The set is closed: every non-success HTTP status and every transport-level
/// failure maps onto exactly one of these kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// HTTP 401, the API token was rejected
    Authentication,
    /// HTTP 429, with the server's `Retry-After` in seconds when it sent one
    RateLimit {
        /// Server-advised wait in seconds
        retry_after: Option<u64>,
    },
    /// HTTP 404
    NotFound,
    /// HTTP 202, the server queued the request for asynchronous processing
    Accepted {
        /// Server-advised wait in seconds
        retry_after: Option<u64>,
    },
    /// The request did not complete within the configured timeout
    Timeout,
    /// The connection to the server could not be established
    ConnectionFailure,
    /// HTTP 5xx, and any nonstandard status above 599
    ServerError {
        /// Response status code
        status: u16,
    },
    /// Any other 4xx, plus 1xx and 3xx
    ClientError {
        /// Response status code
        status: u16,
    },
}

impl ErrorKind {
    /// Whether the transport retries this kind locally before surfacing it
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. }
            | Self::Accepted { .. }
            | Self::Timeout
            | Self::ConnectionFailure
            | Self::ServerError { .. } => true,
            Self::Authentication | Self::NotFound | Self::ClientError { .. } => false,
        }
    }

    /// HTTP status associated with this kind, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication => Some(401),
            Self::RateLimit { .. } => Some(429),
            Self::NotFound => Some(404),
            Self::Accepted { .. } => Some(202),
            Self::ServerError { status } | Self::ClientError { status } => Some(*status),
            Self::Timeout | Self::ConnectionFailure => None,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication"),
            Self::RateLimit { .. } => write!(f, "rate limit"),
            Self::NotFound => write!(f, "not found"),
            Self::Accepted { .. } => write!(f, "accepted"),
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionFailure => write!(f, "connection failure"),
            Self::ServerError { status } => write!(f, "server error ({status})"),
            Self::ClientError { status } => write!(f, "client error ({status})"),
        }
    }
}

/// The main error type for the CourtListener client
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Configuration that cannot be used as given
    #[error("Configuration error: {message}")]
    Config {
        /// What is wrong
        message: String,
    },

    /// A required setting was not provided
    #[error("Missing required config field: {field}")]
    MissingConfigField {
        /// Name of the setting
        field: String,
    },

    /// A setting has an unusable value
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue {
        /// Name of the setting
        field: String,
        /// Why the value was rejected
        message: String,
    },

    /// A base URL or endpoint did not parse
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // API Errors
    // ============================================================================
    /// Classified failure of a request, after any retries
    #[error("{message}")]
    Api {
        /// Taxonomy entry
        kind: ErrorKind,
        /// Human-readable message
        message: String,
    },

    /// Transport failure that fits no [`ErrorKind`]
    #[error("Request failed: {message}")]
    Request {
        /// Underlying error text
        message: String,
    },

    /// A response body was not the expected JSON
    #[error("Failed to parse JSON response: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    /// Fetching a page failed; wraps the request error
    #[error("Failed to fetch page: {source}")]
    Pagination {
        /// Error of the failed page request
        #[source]
        source: Box<Error>,
    },

    /// `check_connection` could not reach the API
    #[error("Connection check failed: {message}")]
    ConnectionCheck {
        /// Description of the underlying failure
        message: String,
    },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an invalid value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a classified API error
    pub fn api(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self::Api {
            kind,
            message: message.into(),
        }
    }

    /// Create an unclassified request failure
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Wrap the failure of a page fetch
    pub fn pagination(source: Error) -> Self {
        Self::Pagination {
            source: Box::new(source),
        }
    }

    /// The classified kind, looking through pagination wrappers
    pub fn kind(&self) -> Option<&ErrorKind> {
        match self {
            Self::Api { kind, .. } => Some(kind),
            Self::Pagination { source } => source.kind(),
            _ => None,
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Request { .. } => true,
            _ => self.kind().is_some_and(ErrorKind::is_retryable),
        }
    }
}

/// Result type alias for the CourtListener client
pub type Result<T> = std::result::Result<T, Error>;
