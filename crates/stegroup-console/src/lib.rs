#![forbid(unsafe_code)]
#![deny(
    unused_must_use,
    unreachable_pub,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Screen state for the STE moderation console.
//!
//! Layout:
//! - `query/`: the debounced, sequence-tagged list [`QueryController`]
//! - `plan.rs`: required + optional concurrent fetches
//! - `mutation.rs`: local patches applied after a confirmed server success
//! - `pages/`: one state holder per screen
//! - `routes.rs`, `messages.rs`, `error.rs`: navigation, localized text, failures

pub mod error;
pub mod messages;
pub mod mutation;
pub mod pages;
pub mod plan;
pub mod query;
pub mod routes;
pub mod sources;

pub use error::{ActionError, ActionResult};
pub use messages::Messages;
pub use mutation::{AutoConfirm, Confirmer, MoveDirection, Outcome};
pub use pages::{
    AggregationDetailPage, AggregationsPage, ItemPage, RatingForm, SearchPage, Selection,
};
pub use plan::Optional;
pub use query::{
    FetchError, Pagination, QueryController, QueryState, Window, WindowRequest, WindowSource,
};
pub use routes::Route;
pub use sources::{AggregationFilter, AggregationSource, CatalogSource};
