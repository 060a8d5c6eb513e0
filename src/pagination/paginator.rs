//! Push-style pagination
//!
//! [`Paginator`] walks a collection page by page and pushes each item to its
//! consumer, either as a [`futures::Stream`] or through a callback.

use super::types::{Page, PageState};
use crate::error::{Error, Result};
use crate::http::{RequestSpec, Transport};
use crate::types::StringMap;
use futures::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use std::ops::ControlFlow;
use std::pin::Pin;

/// Stream of items produced by a traversal
pub type ItemStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// Fetch one page through the transport, wrapping any failure
pub(super) async fn fetch_page(
    transport: &Transport,
    endpoint: &str,
    params: StringMap,
) -> Result<Page> {
    let spec = RequestSpec::get(endpoint).params(params);
    let body = transport.execute(spec).await.map_err(Error::pagination)?;
    Page::from_value(body).map_err(Error::pagination)
}

/// Lazy, finite, non-restartable traversal of a paginated endpoint
#[derive(Debug)]
pub struct Paginator {
    transport: Transport,
    endpoint: String,
    params: StringMap,
    state: PageState,
}

impl Paginator {
    /// Create a paginator; nothing is requested until it is consumed
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

    /// Fetch the next page and return its items
    async fn next_page(&mut self) -> Result<Vec<Value>> {
        let params = self.state.request_params(&self.params);
        match fetch_page(&self.transport, &self.endpoint, params).await {
            Ok(page) => Ok(self.state.absorb(page)),
            Err(e) => {
                self.state.mark_done();
                Err(e)
            }
        }
    }

    /// Consume the paginator as a stream of items.
    ///
    /// A failed page fetch is yielded once and ends the stream.
    pub fn into_stream(self) -> ItemStream {
        let pages = stream::try_unfold(self, |mut paginator| async move {
            if !paginator.state.has_more() {
                return Ok::<_, Error>(None);
            }
            let items = paginator.next_page().await?;
            Ok(Some((items, paginator)))
        });

        Box::pin(
            pages
                .map_ok(|items| stream::iter(items.into_iter().map(Ok::<Value, Error>)))
                .try_flatten(),
        )
    }

    /// Push every item to `f` until the collection ends or `f` breaks
    pub async fn for_each_item<F>(mut self, mut f: F) -> Result<()>
    where
        F: FnMut(Value) -> ControlFlow<()>,
    {
        while self.state.has_more() {
            for item in self.next_page().await? {
                if f(item).is_break() {
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Collect every item
    pub async fn collect_all(self) -> Result<Vec<Value>> {
        self.into_stream().try_collect().await
    }
}
