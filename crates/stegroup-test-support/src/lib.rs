#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Shared test helpers used across console suites.
//! Layout: fixtures.rs (DTO builders), mocks.rs (in-memory grouping service).

pub mod fixtures;
pub mod mocks;

pub use mocks::{Call, FakeModerationApi};
