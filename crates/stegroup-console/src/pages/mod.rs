//! One state holder per console screen.
//!
//! Pages own their state exclusively; nothing is cached across pages. Every
//! action returns `ActionResult<Outcome>` and never prompts or prints on its
//! own: confirmations go through a [`Confirmer`](crate::Confirmer) and
//! messages are rendered by the caller.

mod aggregation_detail;
mod aggregations;
mod item;
mod search;

pub use aggregation_detail::{AggregationDetailPage, RatingForm};
pub use aggregations::AggregationsPage;
pub use item::ItemPage;
pub use search::{SearchPage, Selection};
