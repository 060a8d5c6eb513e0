//! Pagination module
//!
//! Cursor-based traversal of paginated collections.
//!
//! # Overview
//!
//! Collections come back in the envelope
//! `{ "count", "next", "previous", "results" }`. The `cursor` query parameter
//! of `next` is sent with the following request. Two equivalent consumers are
//! provided:
//!
//! - [`Paginator`] pushes items to a stream or a callback
//! - [`PageIterator`] hands out one item per pull
//!
//! Both stop on an empty page, a missing `next` link, or a `next` cursor that
//! repeats the one just used.

mod iterator;
mod paginator;
mod types;

pub use iterator::PageIterator;
pub use paginator::{ItemStream, Paginator};
pub use types::{Page, PagePhase, PageState, PaginationCursor, CURSOR_PARAM};
