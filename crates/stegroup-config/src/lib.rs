#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Configuration for the moderation console.
//!
//! Layout:
//! - `defaults.rs`: default values and accepted ranges
//! - `model.rs`: [`ConsoleConfig`] and [`Locale`]
//! - `loader.rs`: environment parsing and validation
//! - `error.rs`: [`ConfigError`]

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_API_URL, ENV_LOCALE, ENV_LOG_FORMAT, ENV_TIMEOUT_SECS};
pub use model::{ConsoleConfig, Locale};
