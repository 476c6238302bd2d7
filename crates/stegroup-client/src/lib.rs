#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Typed HTTP access to the STE grouping service.
//!
//! Layout:
//! - `api.rs`: the [`ModerationApi`] trait consumed by the console
//! - `http.rs`: the reqwest-backed implementation
//! - `error.rs`: [`ApiError`] and response classification

pub mod api;
pub mod error;
pub mod http;

pub use api::{ModerationApi, SharedApi};
pub use error::{ApiError, ApiResult};
pub use http::{HEADER_REQUEST_ID, HttpModerationApi};
