//! Pagination types and traits
//!
//! Defines the request value threaded through a polling loop and the
//! continuation policy abstraction implemented by every strategy.

use super::policies::{OffsetPolicy, PageNumberPolicy, SinglePagePolicy};
use crate::http::RequestConfig;
use crate::types::StringMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page's request.
///
/// Values are never mutated in place: every builder method and every
/// policy step returns a new request, so a request handed out for logging
/// or inspection cannot change under the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    url: String,
    headers: StringMap,
    params: StringMap,
    proceed: bool,
}

impl PageRequest {
    /// Create a request for `url` that should be issued
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: StringMap::new(),
            params: StringMap::new(),
            proceed: true,
        }
    }

    /// Add a header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add several headers
    #[must_use]
    pub fn with_headers(mut self, headers: StringMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Set a query parameter, replacing any previous value
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Set several query parameters
    #[must_use]
    pub fn with_params(mut self, params: StringMap) -> Self {
        self.params.extend(params);
        self
    }

    /// Same request, marked as not to be issued
    #[must_use]
    pub fn finished(&self) -> Self {
        Self {
            proceed: false,
            ..self.clone()
        }
    }

    /// Request URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Request headers
    pub fn headers(&self) -> &StringMap {
        &self.headers
    }

    /// Query parameters
    pub fn params(&self) -> &StringMap {
        &self.params
    }

    /// A single query parameter
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Whether this request should be issued
    pub fn proceed(&self) -> bool {
        self.proceed
    }

    pub(crate) fn to_request_config(&self) -> RequestConfig {
        RequestConfig {
            query: self.params.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// Records returned by one request
#[derive(Debug, Clone)]
pub struct Page {
    /// 1-based page number within the loop
    pub number: usize,
    /// Records in response order
    pub records: Vec<Value>,
    /// Count reported by the provider
    pub reported_count: Option<u64>,
    /// The request that produced this page
    pub request: PageRequest,
}

impl Page {
    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Rule for advancing pagination parameters and deciding when to stop
pub trait ContinuationPolicy: Send + Sync + std::fmt::Debug {
    /// Largest page the provider returns; a shorter batch is the last one
    fn threshold(&self) -> Option<usize>;

    /// Set the position parameters of the first page
    fn start(&self, request: PageRequest) -> PageRequest;

    /// Request following a page that returned `batch_len` records
    fn next(&self, request: &PageRequest, batch_len: usize) -> PageRequest;
}

/// Declarative pagination settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaginationConfig {
    /// A single request per partition
    #[default]
    None,

    /// `?page=N`, incremented while pages are full
    PageNumber {
        /// Query parameter name for the page number
        #[serde(default = "default_page_param")]
        page_param: String,
        /// First page number
        #[serde(default = "default_start_page")]
        start_page: u32,
        /// Records per full page
        page_size: usize,
        /// Optional parameter announcing the page size
        #[serde(default)]
        page_size_param: Option<String>,
    },

    /// `?skip=N&limit=M`, advanced by the page size while pages are full
    Offset {
        /// Query parameter name for the offset
        #[serde(default = "default_offset_param")]
        offset_param: String,
        /// Query parameter name for the limit
        #[serde(default = "default_limit_param")]
        limit_param: Option<String>,
        /// Records per full page, also the offset stride
        page_size: usize,
    },
}

fn default_page_param() -> String {
    "page".to_string()
}

fn default_start_page() -> u32 {
    1
}

fn default_offset_param() -> String {
    "skip".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_limit_param() -> Option<String> {
    Some("limit".to_string())
}

impl PaginationConfig {
    /// Create page number pagination config
    pub fn page_number(page_param: impl Into<String>, start_page: u32, page_size: usize) -> Self {
        Self::PageNumber {
            page_param: page_param.into(),
            start_page,
            page_size,
            page_size_param: None,
        }
    }

    /// Create offset pagination config
    pub fn offset(
        offset_param: impl Into<String>,
        limit_param: impl Into<String>,
        page_size: usize,
    ) -> Self {
        Self::Offset {
            offset_param: offset_param.into(),
            limit_param: Some(limit_param.into()),
            page_size,
        }
    }

    /// Build the continuation policy
    pub fn build(&self) -> Box<dyn ContinuationPolicy> {
        match self {
            Self::None => Box::new(SinglePagePolicy),
            Self::PageNumber {
                page_param,
                start_page,
                page_size,
                page_size_param,
            } => {
                let mut policy = PageNumberPolicy::new(page_param.clone(), *start_page, *page_size);
                if let Some(param) = page_size_param {
                    policy = policy.with_page_size_param(param.clone());
                }
                Box::new(policy)
            }
            Self::Offset {
                offset_param,
                limit_param,
                page_size,
            } => Box::new(OffsetPolicy::new(
                offset_param.clone(),
                limit_param.clone(),
                *page_size,
            )),
        }
    }
}
