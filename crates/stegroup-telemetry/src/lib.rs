#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives for the moderation console.
//!
//! Centralises tracing subscriber installation and the session span so the
//! CLI and any embedding front end log the same way.

pub mod context;
pub mod error;
pub mod init;

pub use context::session_span;
pub use error::{TelemetryError, TelemetryResult};
pub use init::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, build_sha, init_logging};
