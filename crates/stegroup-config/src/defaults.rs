//! Default values and accepted ranges.
//!
//! # Design
//! - Page sizes mirror the backend limits (`le=100` for catalog search,
//!   `le=500` for the aggregation list).

use std::ops::RangeInclusive;
use std::time::Duration;

/// Base URL of the grouping service including its API prefix.
pub const API_URL: &str = "http://127.0.0.1:8000/api/v1";
/// Per-request HTTP timeout.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(10);
/// Quiet period after the last search keystroke before a fetch is issued.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Catalog search page size.
pub const SEARCH_PAGE_SIZE: u32 = 20;
/// Accepted catalog search page sizes.
pub const SEARCH_PAGE_SIZE_RANGE: RangeInclusive<u32> = 1..=100;
/// Maximum number of aggregations fetched for the list screen.
pub const AGGREGATIONS_LIMIT: u32 = 100;
/// Accepted aggregation list limits.
pub const AGGREGATIONS_LIMIT_RANGE: RangeInclusive<u32> = 1..=500;
