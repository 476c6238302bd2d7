//! Debounced list queries.
//!
//! # Design
//! - [`QueryState`] holds the pure transitions; [`QueryController`] drives it
//!   from a tokio task so fetch results, edits and local patches serialize.
//! - Fetches are tagged with a sequence number and stale responses dropped.
//! - Snapshots are published over a `watch` channel.

mod controller;
mod state;

use std::fmt::Debug;

use async_trait::async_trait;
use stegroup_client::ApiResult;

pub use controller::{QueryController, WindowPatch};
pub use state::{FetchError, Pagination, QueryState, Ticket, Window, WindowRequest};

/// Backend of one list screen.
#[async_trait]
pub trait WindowSource: Send + Sync + 'static {
    /// Query value the screen edits (search text, filter flags).
    type Query: Clone + PartialEq + Debug + Send + Sync + 'static;
    /// Row type.
    type Item: Clone + Debug + Send + Sync + 'static;

    /// Fetch one window.
    async fn fetch(&self, request: WindowRequest<Self::Query>) -> ApiResult<Window<Self::Item>>;
}
