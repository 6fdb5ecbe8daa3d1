//! Pagination driver
//!
//! Runs one stream-partition's polling loop to exhaustion.

use super::types::{ContinuationPolicy, Page, PageRequest};
use crate::envelope::Envelope;
use crate::error::Result;
use crate::http::HttpClient;
use tracing::debug;

/// Polling loop over one stream-partition
///
/// ```rust,ignore
/// let mut driver = PaginationDriver::new(&client, policy.as_ref(), &envelope, request);
/// while let Some(page) = driver.next_page().await? {
///     emit(page.records)?;
/// }
/// ```
pub struct PaginationDriver<'a> {
    client: &'a HttpClient,
    policy: &'a dyn ContinuationPolicy,
    envelope: &'a Envelope,
    request: PageRequest,
    pages: usize,
}

impl<'a> PaginationDriver<'a> {
    /// Create a driver; `initial` receives the policy's start position
    pub fn new(
        client: &'a HttpClient,
        policy: &'a dyn ContinuationPolicy,
        envelope: &'a Envelope,
        initial: PageRequest,
    ) -> Self {
        Self {
            client,
            policy,
            envelope,
            request: policy.start(initial),
            pages: 0,
        }
    }

    /// The request the next call to [`next_page`](Self::next_page) issues
    pub fn request(&self) -> &PageRequest {
        &self.request
    }

    /// Number of requests issued so far
    pub fn pages_fetched(&self) -> usize {
        self.pages
    }

    /// Whether the policy has stopped the loop
    pub fn is_exhausted(&self) -> bool {
        !self.request.proceed()
    }

    /// Fetch the next page, or `None` once the loop is exhausted.
    ///
    /// Transport and envelope errors are returned as-is; the driver is not
    /// meant to be resumed after one.
    pub async fn next_page(&mut self) -> Result<Option<Page>> {
        if self.is_exhausted() {
            return Ok(None);
        }

        let current = self.request.clone();
        let body = self
            .client
            .get_json(current.url(), current.to_request_config())
            .await?;
        let opened = self.envelope.open(body)?;

        self.pages += 1;
        self.request = self.policy.next(&current, opened.records.len());

        debug!(
            page = self.pages,
            records = opened.records.len(),
            reported = ?opened.reported_count,
            last = self.is_exhausted(),
            "Fetched page"
        );

        Ok(Some(Page {
            number: self.pages,
            records: opened.records,
            reported_count: opened.reported_count,
            request: current,
        }))
    }

    /// Replace a filter parameter and rewind to the first position.
    ///
    /// Used when the lower bound moves to the latest record seen: the
    /// remaining records are re-addressed from the start of the new range.
    /// Has no effect once the loop is exhausted.
    pub fn refilter(&mut self, param: &str, value: impl Into<String>) {
        if self.is_exhausted() {
            return;
        }
        let request = self.request.clone().with_param(param, value);
        self.request = self.policy.start(request);
    }
}

impl std::fmt::Debug for PaginationDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationDriver")
            .field("policy", &self.policy)
            .field("request", &self.request)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}
