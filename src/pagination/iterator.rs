//! Pull-style pagination
//!
//! [`PageIterator`] hands out one item per call and only requests the next
//! page once the buffered one is used up.

use super::paginator::{fetch_page, ItemStream};
use super::types::PageState;
use crate::error::Result;
use crate::http::Transport;
use crate::types::StringMap;
use futures::stream::{self, TryStreamExt};
use serde_json::Value;

/// Lazily loading iterator over a paginated endpoint
#[derive(Debug)]
pub struct PageIterator {
    transport: Transport,
    endpoint: String,
    params: StringMap,
    state: PageState,
}

impl PageIterator {
    /// Create an iterator; the first page is loaded on the first pull
    pub fn new(transport: Transport, endpoint: impl Into<String>, params: StringMap) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
            params,
            state: PageState::new(),
        }
    }

    /// Current traversal state
    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Pull the next item, loading pages as needed.
    ///
    /// Returns `None` once the collection is exhausted. A failed page fetch is
    /// returned once, after which the iterator is exhausted.
    pub async fn next_item(&mut self) -> Option<Result<Value>> {
        loop {
            if let Some(item) = self.state.next_buffered() {
                return Some(Ok(item));
            }
            if !self.state.has_more() {
                return None;
            }
            if let Err(e) = self.load_next_page().await {
                return Some(Err(e));
            }
        }
    }

    async fn load_next_page(&mut self) -> Result<()> {
        let params = self.state.request_params(&self.params);
        match fetch_page(&self.transport, &self.endpoint, params).await {
            Ok(page) => {
                self.state.load(page);
                Ok(())
            }
            Err(e) => {
                self.state.mark_done();
                Err(e)
            }
        }
    }

    /// Adapt the iterator into a stream of items
    pub fn into_stream(self) -> ItemStream {
        Box::pin(stream::unfold(self, |mut iter| async move {
            iter.next_item().await.map(|item| (item, iter))
        }))
    }

    /// Collect every remaining item
    pub async fn collect_all(self) -> Result<Vec<Value>> {
        self.into_stream().try_collect().await
    }
}
