//! # Query Cursor
//!
//! Paginated iteration over a query's result set. The cursor holds the query
//! text, the optional page size and the continuation token returned by the
//! previous page.
//!
//! ## States
//!
//! - **HasMore** (initial): `next()` fetches a page. The response's
//!   continuation header becomes the next token; when it is absent the cursor
//!   becomes exhausted.
//! - **Exhausted**: `next()` yields an empty page without fetching.
//!
//! A failed fetch leaves the state untouched, so retrying `next()` resumes from
//! the same token. `next()` takes `&mut self`: one fetch in flight per cursor.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use shared::{constants::HEADER_CONTINUATION, error::RegistryResult};

use crate::transport::{ResponseBody, TransportResponse};
use crate::twin::Twin;

/// Fetches one page of results for a query
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(
        &self,
        query: &str,
        continuation_token: Option<&str>,
        page_size: Option<u32>,
    ) -> RegistryResult<(ResponseBody, TransportResponse)>;
}

/// One page of query results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryPage<T = Value> {
    /// Results in service order
    pub items: Vec<T>,

    /// Transport response of the fetch; `None` when no request was issued
    pub response: Option<TransportResponse>,
}

impl<T> QueryPage<T> {
    fn empty() -> Self {
        Self {
            items: Vec::new(),
            response: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Cursor over a paginated result set
pub struct Query {
    source: Arc<dyn PageSource>,
    query: String,
    page_size: Option<u32>,
    continuation_token: Option<String>,
    has_more_results: bool,
}

impl std::fmt::Debug for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("query", &self.query)
            .field("page_size", &self.page_size)
            .field("continuation_token", &self.continuation_token)
            .field("has_more_results", &self.has_more_results)
            .finish()
    }
}

impl Query {
    /// Create a cursor positioned before the first page
    pub fn new(source: Arc<dyn PageSource>, query: impl Into<String>, page_size: Option<u32>) -> Self {
        Self {
            source,
            query: query.into(),
            page_size,
            continuation_token: None,
            has_more_results: true,
        }
    }

    pub fn query_text(&self) -> &str {
        &self.query
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    pub fn continuation_token(&self) -> Option<&str> {
        self.continuation_token.as_deref()
    }

    pub fn has_more_results(&self) -> bool {
        self.has_more_results
    }

    /// Return to the first-page state
    pub fn reset(&mut self) {
        self.continuation_token = None;
        self.has_more_results = true;
    }

    /// Fetch the next page of raw results
    pub async fn next(&mut self) -> RegistryResult<QueryPage> {
        let Some((items, response)) = self.fetch().await? else {
            return Ok(QueryPage::empty());
        };
        self.advance(&response);

        Ok(QueryPage {
            items,
            response: Some(response),
        })
    }

    /// Fetch the next page and parse each result as a twin.
    ///
    /// The cursor only advances once every item has parsed.
    pub async fn next_as_twin(&mut self) -> RegistryResult<QueryPage<Twin>> {
        let Some((items, response)) = self.fetch().await? else {
            return Ok(QueryPage::empty());
        };
        let items = items
            .into_iter()
            .map(Twin::from_value)
            .collect::<RegistryResult<Vec<_>>>()?;
        self.advance(&response);

        Ok(QueryPage {
            items,
            response: Some(response),
        })
    }

    /// Fetch the page at the current token without touching cursor state.
    /// `None` when the cursor is exhausted.
    async fn fetch(&self) -> RegistryResult<Option<(Vec<Value>, TransportResponse)>> {
        if !self.has_more_results {
            debug!(query = %self.query, "Query exhausted, no request issued");
            return Ok(None);
        }

        let (body, response) = self
            .source
            .fetch_page(&self.query, self.continuation_token.as_deref(), self.page_size)
            .await?;

        Ok(Some((page_items(body.into_json()?), response)))
    }

    fn advance(&mut self, response: &TransportResponse) {
        self.continuation_token = response
            .header(HEADER_CONTINUATION)
            .filter(|token| !token.is_empty())
            .map(str::to_string);
        self.has_more_results = self.continuation_token.is_some();

        if !self.has_more_results {
            info!(query = %self.query, "Query exhausted");
        }
    }
}

fn page_items(body: Value) -> Vec<Value> {
    match body {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}
