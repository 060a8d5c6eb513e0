// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # CourtListener client
//!
//! Async Rust client for the CourtListener REST API (v4).
//!
//! ## Features
//!
//! - **Reliable Transport**: Retries timeouts, connection failures, 429, 202 and 5xx responses
//! - **Retry-After**: Server-advised delays honoured verbatim
//! - **Typed Errors**: Every failure classified into an [`ErrorKind`]
//! - **Cursor Pagination**: Push-style [`Paginator`] and pull-style [`PageIterator`]
//! - **Throttling**: Optional client-side rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use courtlistener::{Config, CourtListenerClient, Result, StringMap};
//! use futures::StreamExt;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::builder().api_token("your-token").build()?;
//!     let client = CourtListenerClient::new(config)?;
//!
//!     client.check_connection().await?;
//!
//!     let mut params = StringMap::new();
//!     params.insert("court".to_string(), "scotus".to_string());
//!
//!     let mut dockets = client.paginate("/dockets/", params).into_stream();
//!     while let Some(docket) = dockets.next().await {
//!         println!("{}", docket?["case_name"]);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   CourtListenerClient                    │
//! │  get / post_json / post_form / paginate / page_iter      │
//! └──────────────────────────────────────────────────────────┘
//!                               │
//! ┌─────────────────────────────┴────────────────────────────┐
//! │     Pagination      │            Transport               │
//! ├─────────────────────┼────────────────────────────────────┤
//! │ PageState           │ URL resolution    Retry / backoff  │
//! │ Paginator (push)    │ Classification    Rate limiting    │
//! │ PageIterator (pull) │ HttpBackend       Sleeper          │
//! └─────────────────────┴────────────────────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types and failure classification
pub mod error;

/// Common types and type aliases
pub mod types;

/// Client configuration
pub mod config;

/// Request transport with retry and rate limiting
pub mod http;

/// Cursor pagination
pub mod pagination;

/// High-level API client
pub mod client;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::CourtListenerClient;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use http::{RequestSpec, RetryPolicy, Transport};
pub use pagination::{Page, PageIterator, Paginator};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
