//! Continuation policy implementations
//!
//! Each policy handles a specific pagination pattern.

use super::types::{ContinuationPolicy, PageRequest};

// ============================================================================
// Page Number Pagination
// ============================================================================

/// Page number pagination
///
/// Common patterns:
/// - `?page=2`
/// - `?page=2&size=5000`
#[derive(Debug, Clone)]
pub struct PageNumberPolicy {
    /// Query parameter name for page number
    pub page_param: String,
    /// First page number (usually 0 or 1)
    pub start_page: u32,
    /// Records per full page
    pub page_size: usize,
    /// Optional page size parameter name
    pub page_size_param: Option<String>,
}

impl PageNumberPolicy {
    /// Create a new page number policy
    pub fn new(page_param: impl Into<String>, start_page: u32, page_size: usize) -> Self {
        Self {
            page_param: page_param.into(),
            start_page,
            page_size,
            page_size_param: None,
        }
    }

    /// Also send the page size
    #[must_use]
    pub fn with_page_size_param(mut self, param: impl Into<String>) -> Self {
        self.page_size_param = Some(param.into());
        self
    }

    fn current_page(&self, request: &PageRequest) -> u32 {
        request
            .param(&self.page_param)
            .and_then(|p| p.parse().ok())
            .unwrap_or(self.start_page)
    }
}

impl ContinuationPolicy for PageNumberPolicy {
    fn threshold(&self) -> Option<usize> {
        Some(self.page_size)
    }

    fn start(&self, request: PageRequest) -> PageRequest {
        let request = request.with_param(&self.page_param, self.start_page.to_string());
        match &self.page_size_param {
            Some(param) => request.with_param(param, self.page_size.to_string()),
            None => request,
        }
    }

    fn next(&self, request: &PageRequest, batch_len: usize) -> PageRequest {
        if batch_len < self.page_size {
            return request.finished();
        }

        let page = self.current_page(request).saturating_add(1);
        request.clone().with_param(&self.page_param, page.to_string())
    }
}

// ============================================================================
// Offset Pagination
// ============================================================================

/// Offset-based pagination
///
/// The offset advances by the page size, which is also the stop threshold.
/// Common patterns:
/// - `?skip=1000&limit=1000`
/// - `?offset=100&limit=100`
#[derive(Debug, Clone)]
pub struct OffsetPolicy {
    /// Query parameter name for offset
    pub offset_param: String,
    /// Query parameter name for limit
    pub limit_param: Option<String>,
    /// Records per page and offset stride
    pub page_size: usize,
}

impl OffsetPolicy {
    /// Create a new offset policy
    pub fn new(
        offset_param: impl Into<String>,
        limit_param: Option<String>,
        page_size: usize,
    ) -> Self {
        Self {
            offset_param: offset_param.into(),
            limit_param,
            page_size,
        }
    }

    fn current_offset(&self, request: &PageRequest) -> usize {
        request
            .param(&self.offset_param)
            .and_then(|o| o.parse().ok())
            .unwrap_or(0)
    }
}

impl ContinuationPolicy for OffsetPolicy {
    fn threshold(&self) -> Option<usize> {
        Some(self.page_size)
    }

    fn start(&self, request: PageRequest) -> PageRequest {
        let request = request.with_param(&self.offset_param, "0");
        match &self.limit_param {
            Some(param) => request.with_param(param, self.page_size.to_string()),
            None => request,
        }
    }

    fn next(&self, request: &PageRequest, batch_len: usize) -> PageRequest {
        if batch_len < self.page_size {
            return request.finished();
        }

        let offset = self.current_offset(request).saturating_add(self.page_size);
        request
            .clone()
            .with_param(&self.offset_param, offset.to_string())
    }
}

// ============================================================================
// Single Page
// ============================================================================

/// One request, no continuation
#[derive(Debug, Clone, Default)]
pub struct SinglePagePolicy;

impl ContinuationPolicy for SinglePagePolicy {
    fn threshold(&self) -> Option<usize> {
        None
    }

    fn start(&self, request: PageRequest) -> PageRequest {
        request
    }

    fn next(&self, request: &PageRequest, _batch_len: usize) -> PageRequest {
        request.finished()
    }
}
