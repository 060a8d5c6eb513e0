//! Pagination types
//!
//! The response envelope, the cursor extracted from `next` links, and the
//! traversal state shared by [`super::Paginator`] and [`super::PageIterator`].

use crate::error::Result;
use crate::types::StringMap;
use serde::Deserialize;
use serde_json::Value;
use std::collections::hash_map::DefaultHasher;
use std::hash::Hasher;
use std::io;
use tracing::{debug, warn};

/// Query parameter carrying the continuation token
pub const CURSOR_PARAM: &str = "cursor";

/// One page of a paginated collection
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Page {
    /// Total number of items, when the server reports it
    #[serde(default)]
    pub count: Option<u64>,
    /// Link to the next page
    #[serde(default)]
    pub next: Option<String>,
    /// Link to the previous page
    #[serde(default)]
    pub previous: Option<String>,
    /// Items on this page; missing and `null` both mean no items
    #[serde(default)]
    pub results: Option<Vec<Value>>,
}

impl Page {
    /// Interpret a response body as a page.
    ///
    /// A body that is not a JSON object (an empty response decodes to `null`)
    /// carries no `results` and is read as an empty, final page.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            debug!("Response body is not an object, treating it as an empty page");
            return Ok(Self::default());
        }
        Ok(serde_json::from_value(value)?)
    }
}

/// Opaque continuation token taken from a page's `next` link
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PaginationCursor(String);

impl PaginationCursor {
    /// Wrap a raw cursor value
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Extract the first `cursor` query parameter from a `next` link.
    ///
    /// Works on absolute and relative links. Returns `None` when the link has
    /// no cursor parameter.
    pub fn from_next_url(next: &str) -> Option<Self> {
        let query = next.split_once('?').map(|(_, q)| q)?;
        let query = query.split_once('#').map_or(query, |(q, _)| q);

        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == CURSOR_PARAM)
            .map(|(_, value)| Self(value.into_owned()))
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PaginationCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cheap summary of a page's items, used to recognise a replayed page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageFingerprint {
    len: usize,
    hash: u64,
}

impl PageFingerprint {
    fn of(items: &[Value]) -> Option<Self> {
        let mut hasher = DefaultHasher::new();
        for item in items {
            serde_json::to_writer(HashWriter(&mut hasher), item).ok()?;
        }
        Some(Self {
            len: items.len(),
            hash: hasher.finish(),
        })
    }
}

/// Feeds serialized JSON straight into a hasher
struct HashWriter<'a>(&'a mut DefaultHasher);

impl io::Write for HashWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Where a traversal stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagePhase {
    /// Nothing requested yet
    #[default]
    FetchingFirst,
    /// A cursor for the next page is held
    HasMore,
    /// Terminal, no further requests are made
    Exhausted,
}

/// Traversal progress shared by both pagination styles
#[derive(Debug, Clone, Default)]
pub struct PageState {
    /// Items of the current page
    pub items: Vec<Value>,
    /// Index of the next item to hand out from `items`
    pub index: usize,
    /// Cursor for the next request
    pub cursor: Option<PaginationCursor>,
    /// Current phase
    pub phase: PagePhase,
    /// Pages fetched so far
    pub pages_fetched: u32,
    /// Fingerprint of the previous page, kept while more pages are expected
    previous_page: Option<PageFingerprint>,
}

impl PageState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether another page should be requested
    pub fn has_more(&self) -> bool {
        self.phase != PagePhase::Exhausted
    }

    /// Mark pagination as complete
    pub fn mark_done(&mut self) {
        self.phase = PagePhase::Exhausted;
    }

    /// Query parameters for the next request: the base params plus the held cursor
    pub fn request_params(&self, base: &StringMap) -> StringMap {
        let mut params = base.clone();
        if let Some(cursor) = &self.cursor {
            params.insert(CURSOR_PARAM.to_string(), cursor.as_str().to_string());
        }
        params
    }

    /// Take the next buffered item of the current page
    pub fn next_buffered(&mut self) -> Option<Value> {
        let item = self.items.get_mut(self.index).map(Value::take)?;
        self.index += 1;
        Some(item)
    }

    /// Absorb a fetched page, advancing the phase, and return its items.
    ///
    /// An empty page is terminal even when it links to another page. A `next`
    /// cursor equal to the one just used is also terminal, so a backend that
    /// keeps serving the same page cannot loop forever; when that page is a
    /// verbatim replay of the previous one its items are dropped.
    pub fn absorb(&mut self, page: Page) -> Vec<Value> {
        self.pages_fetched += 1;
        let previous_page = self.previous_page.take();

        let results = page.results.unwrap_or_default();
        if results.is_empty() {
            debug!("Page {} is empty, pagination complete", self.pages_fetched);
            self.mark_done();
            return results;
        }

        debug!(
            "Page {} returned {} items",
            self.pages_fetched,
            results.len()
        );

        match page.next.as_deref().filter(|next| !next.is_empty()) {
            None => self.mark_done(),
            Some(next) => match PaginationCursor::from_next_url(next) {
                None => {
                    warn!("Next link has no cursor parameter, stopping: {next}");
                    self.mark_done();
                }
                Some(cursor) if self.cursor.as_ref() == Some(&cursor) => {
                    warn!("Next cursor repeats the current one ({cursor}), stopping");
                    self.mark_done();
                    if previous_page.is_some() && PageFingerprint::of(&results) == previous_page {
                        return Vec::new();
                    }
                }
                Some(cursor) => {
                    self.cursor = Some(cursor);
                    self.phase = PagePhase::HasMore;
                    self.previous_page = PageFingerprint::of(&results);
                }
            },
        }

        results
    }

    /// Absorb a page and buffer its items for pull-style consumption
    pub fn load(&mut self, page: Page) {
        self.items = self.absorb(page);
        self.index = 0;
    }
}
