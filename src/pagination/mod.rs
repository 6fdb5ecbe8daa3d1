//! Pagination module
//!
//! Supports: Page Number, Offset, Single Page
//!
//! # Overview
//!
//! A [`PaginationDriver`] runs one stream-partition's polling loop: it
//! issues the current [`PageRequest`], opens the response envelope, hands
//! the batch back to the caller and asks the [`ContinuationPolicy`] for the
//! next request. A batch shorter than the policy threshold is the last page,
//! so an exact multiple of the page size costs one extra, empty request.

mod driver;
mod policies;
mod types;

pub use driver::PaginationDriver;
pub use policies::{OffsetPolicy, PageNumberPolicy, SinglePagePolicy};
pub use types::{ContinuationPolicy, Page, PageRequest, PaginationConfig};
